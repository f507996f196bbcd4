use serde::{Deserialize, Serialize};

/// Lifecycle state of a single satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatelliteState {
    New,
    Initialized,
    Launched,
    Running,
    Stopped,
    Shutdown,
    Error,
}

impl SatelliteState {
    pub const ALL: [SatelliteState; 7] = [
        SatelliteState::New,
        SatelliteState::Initialized,
        SatelliteState::Launched,
        SatelliteState::Running,
        SatelliteState::Stopped,
        SatelliteState::Shutdown,
        SatelliteState::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SatelliteState::New => "new",
            SatelliteState::Initialized => "initialized",
            SatelliteState::Launched => "launched",
            SatelliteState::Running => "running",
            SatelliteState::Stopped => "stopped",
            SatelliteState::Shutdown => "shutdown",
            SatelliteState::Error => "error",
        }
    }
}

impl core::fmt::Display for SatelliteState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing lifecycle actions. Each maps to exactly one target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Initialize,
    Launch,
    Land,
    Start,
    Stop,
    Shutdown,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 6] = [
        LifecycleAction::Initialize,
        LifecycleAction::Launch,
        LifecycleAction::Land,
        LifecycleAction::Start,
        LifecycleAction::Stop,
        LifecycleAction::Shutdown,
    ];
}

/// Legal transitions out of each lifecycle state.
///
/// `error` is terminal except for re-initialization; everything else can
/// always fail over into `error`.
pub fn can_transition(from: SatelliteState, to: SatelliteState) -> bool {
    use self::SatelliteState::*;
    match from {
        New => matches!(to, Initialized | Error),
        Initialized => matches!(to, Launched | Shutdown | Error),
        Launched => matches!(to, Running | Stopped | Initialized | Error),
        Running => matches!(to, Stopped | Error),
        Stopped => matches!(to, Running | Shutdown | Error),
        Shutdown => matches!(to, Initialized | Error),
        Error => matches!(to, Initialized),
    }
}

/// Target state an action drives the satellite toward.
pub fn action_target_state(action: LifecycleAction) -> SatelliteState {
    match action {
        LifecycleAction::Initialize => SatelliteState::Initialized,
        LifecycleAction::Launch => SatelliteState::Launched,
        LifecycleAction::Land => SatelliteState::Initialized,
        LifecycleAction::Start => SatelliteState::Running,
        LifecycleAction::Stop => SatelliteState::Stopped,
        LifecycleAction::Shutdown => SatelliteState::Shutdown,
    }
}

/// An action is enabled iff its target state is reachable from `state`.
pub fn is_action_enabled(state: SatelliteState, action: LifecycleAction) -> bool {
    can_transition(state, action_target_state(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SatelliteState::*;

    #[test]
    fn test_transition_table_exhaustive() {
        // The full 49-pair table, row by row.
        let legal: [(SatelliteState, &[SatelliteState]); 7] = [
            (New, &[Initialized, Error]),
            (Initialized, &[Launched, Shutdown, Error]),
            (Launched, &[Running, Stopped, Initialized, Error]),
            (Running, &[Stopped, Error]),
            (Stopped, &[Running, Shutdown, Error]),
            (Shutdown, &[Initialized, Error]),
            (Error, &[Initialized]),
        ];

        for (from, targets) in legal {
            for to in SatelliteState::ALL {
                assert_eq!(
                    can_transition(from, to),
                    targets.contains(&to),
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for state in SatelliteState::ALL {
            assert!(!can_transition(state, state), "self loop on {state}");
        }
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(action_target_state(LifecycleAction::Initialize), Initialized);
        assert_eq!(action_target_state(LifecycleAction::Launch), Launched);
        assert_eq!(action_target_state(LifecycleAction::Land), Initialized);
        assert_eq!(action_target_state(LifecycleAction::Start), Running);
        assert_eq!(action_target_state(LifecycleAction::Stop), Stopped);
        assert_eq!(action_target_state(LifecycleAction::Shutdown), Shutdown);
    }

    #[test]
    fn test_action_enablement_follows_table() {
        // `start` requires passing through `launched` first.
        assert!(!is_action_enabled(Initialized, LifecycleAction::Start));
        assert!(is_action_enabled(Launched, LifecycleAction::Start));
        // A stopped satellite can resume or shut down, but not launch.
        assert!(is_action_enabled(Stopped, LifecycleAction::Start));
        assert!(is_action_enabled(Stopped, LifecycleAction::Shutdown));
        assert!(!is_action_enabled(Stopped, LifecycleAction::Launch));
        // Only re-initialization leaves `error`.
        for action in LifecycleAction::ALL {
            assert_eq!(
                is_action_enabled(Error, action),
                matches!(action, LifecycleAction::Initialize | LifecycleAction::Land),
                "error state enablement for {action:?}"
            );
        }
    }
}
