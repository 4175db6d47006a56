pub mod error;
pub use error::ResolveError;

pub mod metadata;
pub use metadata::MetadataStore;

pub mod hostname;
pub use hostname::{HostnameResolver, HostnameSource, Resolution, SystemHostname};

pub mod health;
pub use health::{HealthCheck, StaticHealth};

pub mod metrics;
pub use metrics::{HeartbeatOutcome, MetricsBackend, MetricsHandle, NoopMetrics};

pub mod subscriber;
pub use subscriber::LeaseSubscriber;
