mod payload;

mod heartbeat;

mod scheduler;
pub use scheduler::{LeaseScheduler, LeaseSchedulerBuilder};
