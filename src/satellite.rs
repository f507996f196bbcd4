use crate::command::CommandStatus;
use crate::config::{DEFAULT_LIVES, HEARTBEAT_INTERVAL_MS};
use crate::rng::SimRng;
use crate::state_machine::SatelliteState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A supervised satellite entity.
///
/// Identity and connection metadata are fixed at fleet construction;
/// everything else is mutated exclusively by the `FleetRegistry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,

    pub state: SatelliteState,
    pub last_message: String,
    pub last_heartbeat_ms: u64,
    pub last_check_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_command_status: Option<CommandStatus>,
    pub sequence_number: u32,
    pub lives: u8,

    // Static connection metadata, never mutated after creation.
    pub connection_uri: String,
    pub heartbeat_interval_ms: u64,
    pub host_id: String,
    pub metadata: BTreeMap<String, String>,
}

impl Satellite {
    pub fn new(
        id: &str,
        name: &str,
        kind: &str,
        role: &str,
        port: u16,
        now_ms: u64,
        rng: &mut SimRng,
    ) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("host".to_string(), "localhost".to_string());
        metadata.insert("port".to_string(), port.to_string());

        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            role: role.to_string(),
            state: SatelliteState::New,
            last_message: "Waiting for initialization".to_string(),
            last_heartbeat_ms: now_ms,
            last_check_ms: now_ms,
            last_command_status: None,
            sequence_number: 0,
            lives: DEFAULT_LIVES,
            connection_uri: format!("tcp://127.0.0.1:{port}"),
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            host_id: format!("md5-{id}-{}", rng.hex_suffix()),
            metadata,
        }
    }

    /// Eligible to receive simulated inbound heartbeats.
    pub fn accepts_heartbeats(&self) -> bool {
        !matches!(
            self.state,
            SatelliteState::Shutdown | SatelliteState::Error
        )
    }
}

/// The stock three-satellite fleet.
pub fn initial_fleet(now_ms: u64, rng: &mut SimRng) -> Vec<Satellite> {
    vec![
        Satellite::new("sat-1", "DAQ-Controller", "Controller", "primary", 9001, now_ms, rng),
        Satellite::new("sat-2", "Detector-Readout", "Readout", "worker", 9002, now_ms, rng),
        Satellite::new("sat-3", "Storage-Writer", "Storage", "worker", 9003, now_ms, rng),
    ]
}
