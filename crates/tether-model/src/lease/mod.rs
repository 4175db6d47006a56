mod state;
pub use state::LeaseState;

mod event;
pub use event::LeaseEvent;
