use crate::config::RUN_ID_PREFIX;
use crate::global_state::GlobalState;
use serde::{Deserialize, Serialize};

/// Snapshot of the current run, if one is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub duration_seconds: u64,
}

/// Tracks run identity and elapsed time, keyed off the aggregate state
/// entering and leaving `running`.
#[derive(Debug, Default)]
pub struct RunClock {
    run_id: Option<String>,
    duration_seconds: u64,
    was_running: bool,
}

impl RunClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the freshly derived aggregate state. Starts a new run on the
    /// idle→running edge, clears it on the way out.
    pub fn observe(&mut self, state: GlobalState, now_ms: u64) {
        let running = state == GlobalState::Running;
        if running && !self.was_running {
            self.run_id = Some(format!("{RUN_ID_PREFIX}{now_ms}"));
            self.duration_seconds = 0;
            tracing::info!(run_id = self.run_id.as_deref(), "run started");
        }
        if !running && self.was_running {
            tracing::info!(
                run_id = self.run_id.as_deref(),
                duration_s = self.duration_seconds,
                "run stopped"
            );
            self.run_id = None;
            self.duration_seconds = 0;
        }
        self.was_running = running;
    }

    /// One-second duration tick. No-op outside a run.
    pub fn tick(&mut self) {
        if self.run_id.is_some() {
            self.duration_seconds = self.duration_seconds.saturating_add(1);
        }
    }

    pub fn is_active(&self) -> bool {
        self.run_id.is_some()
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            run_id: self.run_id.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}
