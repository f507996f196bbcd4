use crate::config::{DEFAULT_LIVES, HEARTBEAT_TIMEOUT_MS, MAX_RECENT_EVENTS};
use crate::command::CommandStatus;
use crate::rng::SimRng;
use crate::satellite::{initial_fleet, Satellite};
use crate::state_machine::{can_transition, SatelliteState};
use heapless::Deque;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line of recent per-satellite activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteEvent {
    pub timestamp_ms: u64,
    pub message: String,
}

type EventRing = Deque<SatelliteEvent, MAX_RECENT_EVENTS>;

/// Result of a transition request. Rejections are ordinary outcomes, not
/// errors; callers may ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The requested edge is not in the transition table.
    Rejected,
    UnknownId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Applied,
    UnknownId,
}

/// Owns the satellite fleet and every mutation applied to it: lifecycle
/// transitions, sequence updates, command write-backs, the heartbeat
/// sweep, and the simulated inbound heartbeat refresh.
#[derive(Debug)]
pub struct FleetRegistry {
    satellites: Vec<Satellite>,
    events: BTreeMap<String, EventRing>,
    heartbeat_timeout_ms: u64,
}

impl FleetRegistry {
    /// Registry over the stock three-satellite fleet.
    pub fn new(now_ms: u64, rng: &mut SimRng) -> Self {
        Self::with_satellites(initial_fleet(now_ms, rng))
    }

    pub fn with_satellites(satellites: Vec<Satellite>) -> Self {
        Self {
            satellites,
            events: BTreeMap::new(),
            heartbeat_timeout_ms: HEARTBEAT_TIMEOUT_MS,
        }
    }

    pub fn set_heartbeat_timeout_ms(&mut self, timeout_ms: u64) {
        self.heartbeat_timeout_ms = timeout_ms;
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn satellite(&self, id: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }

    /// Immutable snapshot for command simulation, taken at call time.
    pub fn snapshot(&self, id: &str) -> Option<Satellite> {
        self.satellite(id).cloned()
    }

    pub fn recent_events(&self, id: &str) -> Vec<SatelliteEvent> {
        self.events
            .get(id)
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push_event(&mut self, id: &str, message: &str, now_ms: u64) {
        let ring = self.events.entry(id.to_string()).or_insert_with(Deque::new);
        if ring.is_full() {
            ring.pop_front();
        }
        // Cannot fail after the pop above.
        let _ = ring.push_back(SatelliteEvent {
            timestamp_ms: now_ms,
            message: message.to_string(),
        });
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Satellite> {
        self.satellites.iter_mut().find(|s| s.id == id)
    }

    /// Apply a lifecycle transition. Unknown ids and illegal edges leave
    /// the fleet untouched and record no event.
    pub fn transition(
        &mut self,
        id: &str,
        new_state: SatelliteState,
        now_ms: u64,
    ) -> TransitionOutcome {
        let Some(sat) = self.find_mut(id) else {
            return TransitionOutcome::UnknownId;
        };
        let previous = sat.state;
        if !can_transition(previous, new_state) {
            tracing::debug!(id, %previous, requested = %new_state, "transition rejected");
            return TransitionOutcome::Rejected;
        }

        sat.state = new_state;
        sat.last_message = format!("State: {new_state}");

        // Leaving shutdown or error for initialized models a full reboot.
        let recovering = matches!(
            previous,
            SatelliteState::Shutdown | SatelliteState::Error
        ) && new_state == SatelliteState::Initialized;
        if recovering {
            sat.lives = DEFAULT_LIVES;
            sat.last_command_status = None;
            sat.last_message = "Initialized".to_string();
            sat.last_heartbeat_ms = now_ms;
            sat.last_check_ms = now_ms;
        }

        let message = sat.last_message.clone();
        tracing::info!(id, %previous, state = %new_state, "satellite transition");
        self.push_event(id, &message, now_ms);
        TransitionOutcome::Applied
    }

    /// Set the run sequence number. Range policy belongs to the caller.
    pub fn update_sequence(&mut self, id: &str, sequence: u32, now_ms: u64) -> SequenceOutcome {
        let Some(sat) = self.find_mut(id) else {
            return SequenceOutcome::UnknownId;
        };
        sat.sequence_number = sequence;
        self.push_event(id, &format!("Sequence set to {sequence}"), now_ms);
        SequenceOutcome::Applied
    }

    /// Write a completed command exchange back into the entity. The
    /// response was computed from a snapshot; last write wins.
    pub fn apply_command_result(
        &mut self,
        id: &str,
        command: &str,
        status: CommandStatus,
        now_ms: u64,
    ) {
        let Some(sat) = self.find_mut(id) else {
            return;
        };
        sat.last_command_status = Some(status);
        sat.last_check_ms = now_ms;
        sat.last_message = match status {
            CommandStatus::Success => format!("Command: {command}"),
            CommandStatus::Error => format!("Command failed: {command}"),
        };
        self.push_event(id, &format!("Command: {command} → {status}"), now_ms);
    }

    /// Liveness pass over the whole fleet. Only `running` satellites are
    /// checked; a stale heartbeat costs one life, and the last life
    /// forces the satellite into `error`.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let mut missed = Vec::new();
        for sat in &mut self.satellites {
            if sat.state != SatelliteState::Running {
                continue;
            }
            if now_ms.saturating_sub(sat.last_heartbeat_ms) <= self.heartbeat_timeout_ms {
                continue;
            }

            sat.lives = sat.lives.saturating_sub(1);
            sat.last_check_ms = now_ms;
            if sat.lives == 0 {
                sat.state = SatelliteState::Error;
                sat.last_message = "Heartbeat timeout".to_string();
                tracing::warn!(id = %sat.id, "heartbeat timeout, satellite failed out");
                missed.push((sat.id.clone(), "Heartbeat timeout"));
            } else {
                sat.last_message = format!("Heartbeat missed ({} lives)", sat.lives);
                tracing::warn!(id = %sat.id, lives = sat.lives, "heartbeat missed");
                missed.push((sat.id.clone(), "Heartbeat missed"));
            }
        }
        let count = missed.len();
        for (id, message) in missed {
            self.push_event(&id, message, now_ms);
        }
        count
    }

    /// Record an inbound heartbeat for a specific satellite. Returns
    /// false for unknown ids.
    pub fn record_heartbeat(&mut self, id: &str, now_ms: u64) -> bool {
        match self.find_mut(id) {
            Some(sat) => {
                sat.last_heartbeat_ms = now_ms;
                true
            }
            None => false,
        }
    }

    /// Simulated inbound heartbeat: stamp one uniformly random satellite
    /// that is not shut down or failed. No-op on an ineligible fleet.
    pub fn refresh_random_heartbeat(&mut self, now_ms: u64, rng: &mut SimRng) -> Option<String> {
        let eligible: Vec<usize> = self
            .satellites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accepts_heartbeats())
            .map(|(i, _)| i)
            .collect();
        let index = *eligible.get(rng.next_below(eligible.len()))?;
        let sat = &mut self.satellites[index];
        sat.last_heartbeat_ms = now_ms;
        tracing::debug!(id = %sat.id, "heartbeat refreshed");
        Some(sat.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FleetRegistry {
        let mut rng = SimRng::with_seed(9);
        FleetRegistry::new(0, &mut rng)
    }

    /// Drive sat-1 along new -> initialized -> launched -> running.
    fn run_sat1(registry: &mut FleetRegistry, now_ms: u64) {
        assert_eq!(
            registry.transition("sat-1", SatelliteState::Initialized, now_ms),
            TransitionOutcome::Applied
        );
        assert_eq!(
            registry.transition("sat-1", SatelliteState::Launched, now_ms),
            TransitionOutcome::Applied
        );
        assert_eq!(
            registry.transition("sat-1", SatelliteState::Running, now_ms),
            TransitionOutcome::Applied
        );
    }

    #[test]
    fn test_transition_records_event() {
        let mut registry = registry();
        registry.transition("sat-1", SatelliteState::Initialized, 100);

        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.state, SatelliteState::Initialized);
        assert_eq!(sat.last_message, "State: initialized");

        let events = registry.recent_events("sat-1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "State: initialized");
        assert_eq!(events[0].timestamp_ms, 100);
    }

    #[test]
    fn test_illegal_edge_is_silent() {
        let mut registry = registry();
        registry.transition("sat-1", SatelliteState::Initialized, 100);

        // `running` is not reachable from `initialized` directly.
        assert_eq!(
            registry.transition("sat-1", SatelliteState::Running, 200),
            TransitionOutcome::Rejected
        );
        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.state, SatelliteState::Initialized);
        assert_eq!(registry.recent_events("sat-1").len(), 1);
    }

    #[test]
    fn test_unknown_id_is_silent() {
        let mut registry = registry();
        assert_eq!(
            registry.transition("sat-99", SatelliteState::Initialized, 0),
            TransitionOutcome::UnknownId
        );
        assert_eq!(
            registry.update_sequence("sat-99", 5, 0),
            SequenceOutcome::UnknownId
        );
        assert!(registry.recent_events("sat-99").is_empty());
    }

    #[test]
    fn test_recovery_resets_lives_and_status() {
        let mut registry = registry();
        run_sat1(&mut registry, 0);
        registry.apply_command_result("sat-1", "get_state", CommandStatus::Success, 10);

        // Burn all lives via stale sweeps.
        for tick in 1..=3u64 {
            registry.sweep(9_000 * tick);
        }
        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.state, SatelliteState::Error);
        assert_eq!(sat.lives, 0);

        registry.transition("sat-1", SatelliteState::Initialized, 50_000);
        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.lives, DEFAULT_LIVES);
        assert!(sat.last_command_status.is_none());
        assert_eq!(sat.last_message, "Initialized");
        assert_eq!(sat.last_heartbeat_ms, 50_000);
        assert_eq!(sat.last_check_ms, 50_000);
    }

    #[test]
    fn test_sweep_counts_down_and_fails_out() {
        let mut registry = registry();
        run_sat1(&mut registry, 0);

        // Heartbeat stamped at 0; every sweep past the timeout costs a life.
        registry.sweep(9_000);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 2);
        assert_eq!(
            registry.satellite("sat-1").unwrap().last_message,
            "Heartbeat missed (2 lives)"
        );

        registry.sweep(18_000);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 1);

        registry.sweep(27_000);
        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.lives, 0);
        assert_eq!(sat.state, SatelliteState::Error);
        assert_eq!(sat.last_message, "Heartbeat timeout");

        // Failed satellites are exempt from further sweeps.
        assert_eq!(registry.sweep(36_000), 0);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 0);
    }

    #[test]
    fn test_sweep_within_timeout_is_idempotent() {
        let mut registry = registry();
        run_sat1(&mut registry, 0);

        registry.sweep(9_000);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 2);

        // A refresh between sweeps restores the window; the next two
        // sweeps inside it change nothing.
        registry
            .satellites
            .iter_mut()
            .find(|s| s.id == "sat-1")
            .unwrap()
            .last_heartbeat_ms = 9_500;
        assert_eq!(registry.sweep(10_000), 0);
        assert_eq!(registry.sweep(12_000), 0);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 2);
    }

    #[test]
    fn test_sweep_ignores_non_running_states() {
        let mut registry = registry();
        registry.transition("sat-1", SatelliteState::Initialized, 0);
        // Stale heartbeat but not running: exempt.
        assert_eq!(registry.sweep(100_000), 0);
        assert_eq!(registry.satellite("sat-1").unwrap().lives, DEFAULT_LIVES);
    }

    #[test]
    fn test_lives_stay_clamped() {
        let mut registry = registry();
        run_sat1(&mut registry, 0);
        for tick in 1..=10u64 {
            registry.sweep(9_000 * tick);
            let lives = registry.satellite("sat-1").unwrap().lives;
            assert!(lives <= DEFAULT_LIVES);
        }
        assert_eq!(registry.satellite("sat-1").unwrap().lives, 0);
    }

    #[test]
    fn test_update_sequence_records_event() {
        let mut registry = registry();
        assert_eq!(
            registry.update_sequence("sat-2", 123, 50),
            SequenceOutcome::Applied
        );
        assert_eq!(registry.satellite("sat-2").unwrap().sequence_number, 123);
        assert_eq!(
            registry.recent_events("sat-2")[0].message,
            "Sequence set to 123"
        );
    }

    #[test]
    fn test_command_result_write_back() {
        let mut registry = registry();
        registry.apply_command_result("sat-1", "get_version", CommandStatus::Success, 400);

        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.last_command_status, Some(CommandStatus::Success));
        assert_eq!(sat.last_check_ms, 400);
        assert_eq!(sat.last_message, "Command: get_version");
        assert_eq!(
            registry.recent_events("sat-1")[0].message,
            "Command: get_version → SUCCESS"
        );

        registry.apply_command_result("sat-1", "get_config", CommandStatus::Error, 500);
        let sat = registry.satellite("sat-1").unwrap();
        assert_eq!(sat.last_message, "Command failed: get_config");
    }

    #[test]
    fn test_event_ring_keeps_most_recent_five() {
        let mut registry = registry();
        for seq in 1..=8 {
            registry.update_sequence("sat-1", seq, u64::from(seq));
        }
        let events = registry.recent_events("sat-1");
        assert_eq!(events.len(), MAX_RECENT_EVENTS);
        assert_eq!(events[0].message, "Sequence set to 4");
        assert_eq!(events[4].message, "Sequence set to 8");
    }

    #[test]
    fn test_refresh_skips_shutdown_and_error() {
        let mut registry = registry();
        let mut rng = SimRng::with_seed(2);

        // Fail sat-1 out, shut sat-2 down; only sat-3 stays eligible.
        registry.transition("sat-1", SatelliteState::Error, 0);
        registry.transition("sat-2", SatelliteState::Initialized, 0);
        registry.transition("sat-2", SatelliteState::Shutdown, 0);

        for round in 0..20 {
            let refreshed = registry.refresh_random_heartbeat(1_000 + round, &mut rng);
            assert_eq!(refreshed.as_deref(), Some("sat-3"));
        }
        assert!(registry.satellite("sat-3").unwrap().last_heartbeat_ms >= 1_000);
        assert_eq!(registry.satellite("sat-1").unwrap().last_heartbeat_ms, 0);
    }

    #[test]
    fn test_refresh_with_no_eligible_fleet_is_noop() {
        let mut registry = FleetRegistry::with_satellites(Vec::new());
        let mut rng = SimRng::new();
        assert!(registry.refresh_random_heartbeat(0, &mut rng).is_none());
    }
}
