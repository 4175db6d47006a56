use serde::{Deserialize, Serialize};

/// Availability advertised to the discovery directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    /// Ready to receive traffic.
    Up,
    /// Registered, but still waiting for a health check to pass.
    Starting,
}

impl InstanceStatus {
    /// Status to advertise given the init flag and the latest health check result.
    ///
    /// An instance enabled on init is always `Up`; otherwise it stays `Starting`
    /// until a health check reports healthy.
    pub fn resolve(enabled_on_init: bool, healthy: Option<bool>) -> Self {
        if enabled_on_init {
            return InstanceStatus::Up;
        }
        match healthy {
            Some(true) => InstanceStatus::Up,
            Some(false) | None => InstanceStatus::Starting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_on_init_ignores_health() {
        assert_eq!(InstanceStatus::resolve(true, None), InstanceStatus::Up);
        assert_eq!(InstanceStatus::resolve(true, Some(false)), InstanceStatus::Up);
    }

    #[test]
    fn health_check_gates_traffic() {
        assert_eq!(InstanceStatus::resolve(false, None), InstanceStatus::Starting);
        assert_eq!(
            InstanceStatus::resolve(false, Some(false)),
            InstanceStatus::Starting
        );
        assert_eq!(InstanceStatus::resolve(false, Some(true)), InstanceStatus::Up);
    }

    #[test]
    fn serializes_in_upper_case() {
        let json = serde_json::to_string(&InstanceStatus::Starting).unwrap();
        assert_eq!(json, r#""STARTING""#);
    }
}
