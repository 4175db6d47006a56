use serde::{Deserialize, Serialize};

/// Local view of the instance's lease in the discovery directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaseState {
    /// Constructed, no heartbeat sent yet.
    Pending,
    /// Heartbeats are being sent on schedule.
    Active,
    /// No successful renewal within the expiration window; heartbeats are paused
    /// until the owner re-registers and starts again.
    LeaseLost,
    /// Shutdown was requested. Terminal.
    Stopped,
}

impl LeaseState {
    /// Returns `true` if no transition can leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaseState::Stopped)
    }

    /// Returns `true` if the scheduler may be started from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, LeaseState::Pending | LeaseState::LeaseLost)
    }

    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseState::Pending => "pending",
            LeaseState::Active => "active",
            LeaseState::LeaseLost => "lease_lost",
            LeaseState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for LeaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startable_states() {
        assert!(LeaseState::Pending.can_start());
        assert!(LeaseState::LeaseLost.can_start());

        assert!(!LeaseState::Active.can_start());
        assert!(!LeaseState::Stopped.can_start());
    }

    #[test]
    fn only_stopped_is_terminal() {
        assert!(LeaseState::Stopped.is_terminal());
        assert!(!LeaseState::LeaseLost.is_terminal());
        assert!(!LeaseState::Active.is_terminal());
    }

    #[test]
    fn display_and_serde_labels() {
        let json = serde_json::to_string(&LeaseState::LeaseLost).unwrap();
        assert_eq!(json, r#""leaseLost""#);
        assert_eq!(LeaseState::LeaseLost.to_string(), "lease_lost");
    }
}
