use tether_model::LeaseEvent;

/// Receives lease lifecycle notifications.
///
/// Called synchronously from the heartbeat worker; implementations must return quickly
/// and must not block on the scheduler that emitted the event.
pub trait LeaseSubscriber: Send + Sync {
    fn on_event(&self, event: &LeaseEvent);
}

impl<F> LeaseSubscriber for F
where
    F: Fn(&LeaseEvent) + Send + Sync,
{
    fn on_event(&self, event: &LeaseEvent) {
        self(event)
    }
}
