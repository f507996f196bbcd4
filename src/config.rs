use serde::{Deserialize, Serialize};

pub const DEFAULT_LIVES: u8 = 3;
pub const MAX_RECENT_EVENTS: usize = 5;
pub const MAX_LOG_ENTRIES: usize = 1000;
pub const MAX_SEQUENCE_NUMBER: u32 = 999_999;

pub const HEARTBEAT_INTERVAL_MS: u64 = 3000;
pub const HEARTBEAT_TIMEOUT_MS: u64 = 8000;
pub const SWEEP_PERIOD_MS: u64 = 2000;
pub const REFRESH_PERIOD_MS: u64 = 3000;
pub const LOG_SYNTHESIS_PERIOD_MS: u64 = 800;
pub const RATE_RECOMPUTE_PERIOD_MS: u64 = 5000;
pub const RUN_TICK_PERIOD_MS: u64 = 1000;
pub const COMMAND_LATENCY_MS: u64 = 300;

pub const RUN_ID_PREFIX: &str = "run-";

/// Tunable knobs for the constellation engines.
///
/// Defaults reproduce the stock deployment; the demo binary exposes a
/// subset as flags. Capacities (`MAX_RECENT_EVENTS`, `MAX_LOG_ENTRIES`)
/// are compile-time and not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstellationConfig {
    pub heartbeat_timeout_ms: u64,
    pub sweep_period_ms: u64,
    pub refresh_period_ms: u64,
    pub log_synthesis_period_ms: u64,
    pub rate_recompute_period_ms: u64,
    pub run_tick_period_ms: u64,
    pub command_latency_ms: u64,
    /// Probability (0..=100) that a simulated command answers with an
    /// injected link fault. Zero keeps the always-SUCCESS contract.
    pub command_fault_percent: f32,
}

impl Default for ConstellationConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_ms: HEARTBEAT_TIMEOUT_MS,
            sweep_period_ms: SWEEP_PERIOD_MS,
            refresh_period_ms: REFRESH_PERIOD_MS,
            log_synthesis_period_ms: LOG_SYNTHESIS_PERIOD_MS,
            rate_recompute_period_ms: RATE_RECOMPUTE_PERIOD_MS,
            run_tick_period_ms: RUN_TICK_PERIOD_MS,
            command_latency_ms: COMMAND_LATENCY_MS,
            command_fault_percent: 0.0,
        }
    }
}
