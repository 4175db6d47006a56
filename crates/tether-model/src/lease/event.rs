use std::time::Duration;

/// Notification emitted by a lease scheduler to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseEvent {
    /// The scheduler entered `Active` and will send the first heartbeat right away.
    Started,
    /// The directory no longer knows the instance; a fresh registration is required.
    ReregistrationRequested,
    /// A registration was accepted by the directory.
    Registered,
    /// No successful renewal for longer than the expiration window.
    LeaseLost {
        /// Time since the last successful renewal (or since start, if none succeeded).
        since_last_renewal: Duration,
    },
    /// The scheduler stopped and will not send anything else.
    Stopped,
}

impl LeaseEvent {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseEvent::Started => "started",
            LeaseEvent::ReregistrationRequested => "reregistration_requested",
            LeaseEvent::Registered => "registered",
            LeaseEvent::LeaseLost { .. } => "lease_lost",
            LeaseEvent::Stopped => "stopped",
        }
    }
}
