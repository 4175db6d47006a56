use std::sync::Arc;

use tether_model::LeaseState;

/// Result of one heartbeat tick, as seen by metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Success,
    NotFound,
    Transient,
}

impl HeartbeatOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            HeartbeatOutcome::Success => "success",
            HeartbeatOutcome::NotFound => "not_found",
            HeartbeatOutcome::Transient => "transient",
        }
    }
}

/// Sink for lease client metrics.
///
/// Recoverable failures are reported here instead of being returned to the caller.
pub trait MetricsBackend: Send + Sync {
    fn record_heartbeat(&self, outcome: HeartbeatOutcome);
    fn set_consecutive_failures(&self, count: u32);
    fn record_state(&self, state: LeaseState);
    fn record_registration(&self, ok: bool);
    fn record_deregistration(&self, ok: bool);
    fn record_hostname_refresh(&self, ok: bool);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn handle() -> MetricsHandle {
        Arc::new(NoopMetrics)
    }
}

impl MetricsBackend for NoopMetrics {
    fn record_heartbeat(&self, _outcome: HeartbeatOutcome) {}
    fn set_consecutive_failures(&self, _count: u32) {}
    fn record_state(&self, _state: LeaseState) {}
    fn record_registration(&self, _ok: bool) {}
    fn record_deregistration(&self, _ok: bool) {}
    fn record_hostname_refresh(&self, _ok: bool) {}
}
