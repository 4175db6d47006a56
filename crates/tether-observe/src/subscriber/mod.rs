mod view;
pub use view::{log_event, message_for};

use tether_core::LeaseSubscriber;
use tether_model::LeaseEvent;

/// Logs every lease event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSubscriber;

impl LeaseSubscriber for LogSubscriber {
    fn on_event(&self, event: &LeaseEvent) {
        log_event(event);
    }
}
