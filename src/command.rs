//! Deterministic command-response simulation.
//!
//! Stands in for the remote command/response protocol: a pure function
//! over an entity snapshot and a command string. No failure path is
//! modeled here; every recognized or unrecognized command answers
//! SUCCESS. The optional link-fault hook lives with the caller.

use crate::satellite::Satellite;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Product identification reported by `get_version`. Reproduced verbatim
/// for client compatibility.
pub const PRODUCT_VERSION: &str = "Constellation v0.7 (Reticulum)";

/// The fixed command vocabulary advertised by `get_commands`.
pub const COMMAND_VOCABULARY: [&str; 9] = [
    "get_state",
    "get_status",
    "get_version",
    "get_run_id",
    "get_commands",
    "get_config",
    "get_name",
    "get_role",
    "initialize",
];

pub const MAX_AUTONOMY_HEARTBEAT_INTERVAL_S: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERROR")]
    Error,
}

impl core::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandStatus::Success => f.write_str("SUCCESS"),
            CommandStatus::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    pub payload: Value,
}

impl CommandResponse {
    pub fn success(payload: Value) -> Self {
        Self {
            status: CommandStatus::Success,
            payload,
        }
    }

    pub fn error(payload: Value) -> Self {
        Self {
            status: CommandStatus::Error,
            payload,
        }
    }
}

/// Canonical command spelling: lowercase, hyphens folded to underscores.
pub fn normalize_command(command: &str) -> String {
    command.to_lowercase().replace('-', "_")
}

/// Millisecond epoch timestamp as an ISO-8601 string.
fn iso8601(timestamp_ms: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_ms) * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("{timestamp_ms}ms"))
}

/// Compute the simulated response for `command` against a satellite
/// snapshot taken at call time.
pub fn simulate_command(sat: &Satellite, command: &str) -> CommandResponse {
    let cmd = normalize_command(command);

    let payload = match cmd.as_str() {
        "get_state" => json!({ "state": sat.state }),
        "get_status" => json!({
            "state": sat.state,
            "last_message": sat.last_message,
            "last_heartbeat": iso8601(sat.last_heartbeat_ms),
            "lives": sat.lives,
        }),
        "get_version" => json!({ "version": PRODUCT_VERSION }),
        "get_run_id" => json!({ "run_id": format!("run_{}", sat.sequence_number) }),
        "get_commands" => json!({ "commands": COMMAND_VOCABULARY }),
        "initialize" => json!({
            "_autonomy": {
                "max_heartbeat_interval": MAX_AUTONOMY_HEARTBEAT_INTERVAL_S,
                "role": sat.role.to_uppercase(),
            },
            "_data": { "interval": sat.heartbeat_interval_ms },
        }),
        _ => json!({ "command": cmd, "message": "Simulated response" }),
    };

    CommandResponse::success(payload)
}

/// Response substituted when the configured link-fault hook fires.
pub fn link_fault_response(command: &str) -> CommandResponse {
    CommandResponse::error(json!({
        "command": normalize_command(command),
        "error": "Injected link fault",
    }))
}

/// Answer for a command addressed to an unknown satellite id.
pub fn not_found_response() -> CommandResponse {
    CommandResponse::error(json!({ "error": "Satellite not found" }))
}
