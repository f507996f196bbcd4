use crate::satellite::Satellite;
use crate::state_machine::SatelliteState;
use serde::{Deserialize, Serialize};

/// Constellation-wide summary state, derived from the fleet on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalState {
    Idle,
    New,
    Initialized,
    Launched,
    Running,
    Stopped,
    Shutdown,
    Mixed,
    Error,
}

impl From<SatelliteState> for GlobalState {
    fn from(state: SatelliteState) -> Self {
        match state {
            SatelliteState::New => GlobalState::New,
            SatelliteState::Initialized => GlobalState::Initialized,
            SatelliteState::Launched => GlobalState::Launched,
            SatelliteState::Running => GlobalState::Running,
            SatelliteState::Stopped => GlobalState::Stopped,
            SatelliteState::Shutdown => GlobalState::Shutdown,
            SatelliteState::Error => GlobalState::Error,
        }
    }
}

impl core::fmt::Display for GlobalState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            GlobalState::Idle => "idle",
            GlobalState::New => "new",
            GlobalState::Initialized => "initialized",
            GlobalState::Launched => "launched",
            GlobalState::Running => "running",
            GlobalState::Stopped => "stopped",
            GlobalState::Shutdown => "shutdown",
            GlobalState::Mixed => "mixed",
            GlobalState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Reduce the fleet to one state: empty is idle, any error wins, a
/// unanimous fleet reports its shared state, anything else is mixed.
pub fn derive_global_state(satellites: &[Satellite]) -> GlobalState {
    let Some(first) = satellites.first() else {
        return GlobalState::Idle;
    };
    if satellites
        .iter()
        .any(|s| s.state == SatelliteState::Error)
    {
        return GlobalState::Error;
    }
    if satellites.iter().all(|s| s.state == first.state) {
        return first.state.into();
    }
    GlobalState::Mixed
}
