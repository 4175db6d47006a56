use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Name reported for instances outside any cloud provider.
pub const OWN_DATA_CENTER: &str = "MyOwn";

/// Deployment environment of the instance.
///
/// Resolved once at startup. The variant decides which extra fields go into the
/// registration payload.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum DataCenterInfo {
    /// Self-hosted; contributes nothing beyond its name.
    #[default]
    Own,
    /// Hosted by a cloud provider that exposes instance metadata.
    Cloud(CloudMetadata),
}

/// Provider-supplied identity of a cloud instance.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMetadata {
    /// Provider name, e.g. `"Amazon"`.
    pub provider: String,
    pub region: String,
    pub availability_zone: String,
    /// Provider instance id, e.g. `"i-0abc..."`.
    pub instance_id: String,
}

impl DataCenterInfo {
    /// Name under which the data center is reported.
    pub fn name(&self) -> &str {
        match self {
            DataCenterInfo::Own => OWN_DATA_CENTER,
            DataCenterInfo::Cloud(meta) => &meta.provider,
        }
    }

    /// Extra registration fields contributed by this environment.
    ///
    /// Always empty for [`DataCenterInfo::Own`].
    pub fn describe(&self) -> HashMap<String, String> {
        match self {
            DataCenterInfo::Own => HashMap::new(),
            DataCenterInfo::Cloud(meta) => HashMap::from([
                ("provider".to_string(), meta.provider.clone()),
                ("region".to_string(), meta.region.clone()),
                ("availability-zone".to_string(), meta.availability_zone.clone()),
                ("instance-id".to_string(), meta.instance_id.clone()),
            ]),
        }
    }

    /// Provider instance id, if the environment has one.
    pub fn instance_id(&self) -> Option<&str> {
        match self {
            DataCenterInfo::Own => None,
            DataCenterInfo::Cloud(meta) => Some(meta.instance_id.as_str()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let DataCenterInfo::Cloud(meta) = self else {
            return Ok(());
        };
        if meta.provider.trim().is_empty() {
            return Err(ConfigError::IncompleteDataCenter("provider"));
        }
        if meta.instance_id.trim().is_empty() {
            return Err(ConfigError::IncompleteDataCenter("instance id"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aws() -> DataCenterInfo {
        DataCenterInfo::Cloud(CloudMetadata {
            provider: "Amazon".into(),
            region: "us-east-1".into(),
            availability_zone: "us-east-1c".into(),
            instance_id: "i-0123456789".into(),
        })
    }

    #[test]
    fn own_data_center_contributes_nothing() {
        let dc = DataCenterInfo::Own;
        assert_eq!(dc.name(), OWN_DATA_CENTER);
        assert!(dc.describe().is_empty());
        assert!(dc.instance_id().is_none());
    }

    #[test]
    fn cloud_data_center_describes_provider_fields() {
        let dc = aws();
        let fields = dc.describe();

        assert_eq!(dc.name(), "Amazon");
        assert_eq!(dc.instance_id(), Some("i-0123456789"));
        assert_eq!(fields.len(), 4);
        assert_eq!(fields["availability-zone"], "us-east-1c");
        assert_eq!(fields["region"], "us-east-1");
    }

    #[test]
    fn serde_uses_name_tag() {
        let json = serde_json::to_value(aws()).unwrap();
        assert_eq!(json["name"], "cloud");
        assert_eq!(json["availabilityZone"], "us-east-1c");

        let own: DataCenterInfo = serde_json::from_str(r#"{"name":"own"}"#).unwrap();
        assert_eq!(own, DataCenterInfo::Own);
    }

    #[test]
    fn provider_is_required_for_cloud() {
        let dc = DataCenterInfo::Cloud(CloudMetadata {
            instance_id: "i-1".into(),
            ..CloudMetadata::default()
        });
        assert_eq!(
            dc.validate().unwrap_err(),
            ConfigError::IncompleteDataCenter("provider")
        );
    }
}
