//! Lease client for a discovery directory.
//!
//! A [`LeaseScheduler`] keeps an instance registered by sending heartbeats every
//! renewal interval, re-registers when the directory has forgotten the instance, and
//! reports [`LeaseState::LeaseLost`](tether_model::LeaseState::LeaseLost) when no renewal
//! succeeded within the expiration window.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether_discover::{DiscoverConfig, HttpTransport, LeaseScheduler};
//! use tether_model::{InstanceDescriptor, InstanceSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = InstanceDescriptor::new(InstanceSettings::new("billing").with_lease(10, 35))?;
//! let config = DiscoverConfig::new("http://localhost:8761/eureka");
//! let transport = Arc::new(HttpTransport::new(&config)?);
//!
//! let scheduler = LeaseScheduler::builder(descriptor, transport)
//!     .config(config)
//!     .build()?;
//! scheduler.metadata().set("build", "1234");
//! scheduler.start()?;
//! // ...
//! scheduler.stop().await;
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::DiscoverConfig;

mod errors;
pub use errors::DiscoverError;

mod transport;
pub use transport::{DiscoveryTransport, HttpTransport, RenewalStatus};

mod tasks;
pub use tasks::{LeaseScheduler, LeaseSchedulerBuilder};
