use thiserror::Error;

/// Rejected instance configuration.
///
/// Raised only while building an [`InstanceDescriptor`](crate::InstanceDescriptor);
/// a descriptor that exists is always valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("app name must not be empty")]
    EmptyAppName,
    #[error("at least one of the secure and non-secure ports must be enabled")]
    NoPortEnabled,
    #[error("{name} port is enabled but set to 0")]
    InvalidPort { name: &'static str },
    #[error("lease renewal interval must be positive")]
    ZeroRenewalInterval,
    #[error(
        "lease expiration ({expiration_secs}s) must exceed renewal interval ({renewal_secs}s)"
    )]
    ExpirationNotAfterRenewal {
        renewal_secs: u32,
        expiration_secs: u32,
    },
    #[error("cloud data center info is missing {0}")]
    IncompleteDataCenter(&'static str),
}
