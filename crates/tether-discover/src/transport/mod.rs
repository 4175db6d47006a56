mod http;
pub use http::HttpTransport;

use async_trait::async_trait;
use tether_model::RegistrationPayload;

use crate::errors::DiscoverError;

/// Directory's answer to a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalStatus {
    /// Lease extended.
    Renewed,
    /// The directory has no lease for this instance.
    NotFound,
}

/// Wire access to the discovery directory.
///
/// Any `Err` is treated as transient by the scheduler and retried on the next tick.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    async fn register(&self, payload: &RegistrationPayload) -> Result<(), DiscoverError>;

    async fn heartbeat(&self, app: &str, instance_id: &str)
    -> Result<RenewalStatus, DiscoverError>;

    async fn deregister(&self, app: &str, instance_id: &str) -> Result<(), DiscoverError>;
}
