use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DiscoverError;

/// Connection and timeout settings for talking to the discovery directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoverConfig {
    /// Base URL of the directory's REST API.
    pub service_url: String,
    /// Bound for a single heartbeat (default: 5 seconds).
    pub heartbeat_timeout_ms: u64,
    /// Bound for a registration (default: 10 seconds).
    pub registration_timeout_ms: u64,
    /// Bound for the final deregistration on shutdown (default: 5 seconds).
    pub deregistration_timeout_ms: u64,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8761/eureka".to_string(),
            heartbeat_timeout_ms: 5_000,
            registration_timeout_ms: 10_000,
            deregistration_timeout_ms: 5_000,
        }
    }
}

impl DiscoverConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DiscoverError> {
        let url = self.service_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DiscoverError::InvalidConfig(format!(
                "service url must be http(s), got {:?}",
                self.service_url
            )));
        }
        for (name, value) in [
            ("heartbeat timeout", self.heartbeat_timeout_ms),
            ("registration timeout", self.registration_timeout_ms),
            ("deregistration timeout", self.deregistration_timeout_ms),
        ] {
            if value == 0 {
                return Err(DiscoverError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_millis(self.registration_timeout_ms)
    }

    pub fn deregistration_timeout(&self) -> Duration {
        Duration::from_millis(self.deregistration_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = DiscoverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.heartbeat_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let cfg = DiscoverConfig::new("localhost:8761");
        assert!(matches!(cfg.validate(), Err(DiscoverError::InvalidConfig(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = DiscoverConfig {
            heartbeat_timeout_ms: 0,
            ..DiscoverConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DiscoverError::InvalidConfig(_))));
    }
}
