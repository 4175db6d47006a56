use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_LEASE_EXPIRATION_SECS, DEFAULT_LEASE_RENEWAL_SECS, DEFAULT_NON_SECURE_PORT,
    DEFAULT_SECURE_PORT, DataCenterInfo, Metadata,
};

/// Raw, unvalidated instance settings.
///
/// This is what a configuration loader produces. Every field has a default, so partial
/// documents deserialize cleanly. Turn it into an [`InstanceDescriptor`](crate::InstanceDescriptor)
/// to validate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceSettings {
    pub app_name: String,
    /// Explicit instance id. When absent the cloud instance id or the hostname is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Take traffic right after registration instead of waiting for a health check.
    pub instance_enabled_on_init: bool,
    pub non_secure_port: u16,
    pub non_secure_port_enabled: bool,
    pub secure_port: u16,
    pub secure_port_enabled: bool,
    pub lease_renewal_interval_secs: u32,
    pub lease_expiration_duration_secs: u32,
    pub virtual_host_name: String,
    pub secure_virtual_host_name: String,
    pub asg_name: String,
    pub ip_address: String,
    /// Initial metadata; the running instance may change it later.
    pub metadata: Metadata,
    pub data_center: DataCenterInfo,
}

impl InstanceSettings {
    /// Settings with defaults for everything except the app name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    pub fn with_lease(mut self, renewal_secs: u32, expiration_secs: u32) -> Self {
        self.lease_renewal_interval_secs = renewal_secs;
        self.lease_expiration_duration_secs = expiration_secs;
        self
    }

    pub fn with_non_secure_port(mut self, port: u16, enabled: bool) -> Self {
        self.non_secure_port = port;
        self.non_secure_port_enabled = enabled;
        self
    }

    pub fn with_secure_port(mut self, port: u16, enabled: bool) -> Self {
        self.secure_port = port;
        self.secure_port_enabled = enabled;
        self
    }

    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    pub fn with_enabled_on_init(mut self, enabled: bool) -> Self {
        self.instance_enabled_on_init = enabled;
        self
    }

    pub fn with_data_center(mut self, info: DataCenterInfo) -> Self {
        self.data_center = info;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            instance_id: None,
            instance_enabled_on_init: false,
            non_secure_port: DEFAULT_NON_SECURE_PORT,
            non_secure_port_enabled: true,
            secure_port: DEFAULT_SECURE_PORT,
            secure_port_enabled: false,
            lease_renewal_interval_secs: DEFAULT_LEASE_RENEWAL_SECS,
            lease_expiration_duration_secs: DEFAULT_LEASE_EXPIRATION_SECS,
            virtual_host_name: String::new(),
            secure_virtual_host_name: String::new(),
            asg_name: String::new(),
            ip_address: String::new(),
            metadata: Metadata::new(),
            data_center: DataCenterInfo::Own,
        }
    }
}
