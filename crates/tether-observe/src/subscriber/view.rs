use tether_model::LeaseEvent;
use tracing::{debug, error, info, warn};

#[inline]
pub fn message_for(event: &LeaseEvent) -> &'static str {
    match event {
        LeaseEvent::Started => "lease scheduler active, first heartbeat due now",
        LeaseEvent::ReregistrationRequested => "directory lost the lease; re-registration requested",
        LeaseEvent::Registered => "registration accepted by directory",
        LeaseEvent::LeaseLost { .. } => "lease expired locally; heartbeats paused",
        LeaseEvent::Stopped => "lease scheduler stopped",
    }
}

#[inline]
pub fn log_event(event: &LeaseEvent) {
    let msg = message_for(event);

    match event {
        LeaseEvent::Started => info!(event = event.as_str(), "{msg}"),
        LeaseEvent::Registered => debug!(event = event.as_str(), "{msg}"),
        LeaseEvent::ReregistrationRequested => warn!(event = event.as_str(), "{msg}"),
        LeaseEvent::LeaseLost { since_last_renewal } => error!(
            event = event.as_str(),
            since_last_renewal_ms = since_last_renewal.as_millis() as u64,
            "{msg}"
        ),
        LeaseEvent::Stopped => info!(event = event.as_str(), "{msg}"),
    }
}
