use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{InstanceConfig, InstanceStatus, Metadata};

/// Record sent to the discovery directory on (re-)registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub instance_id: String,
    /// Application name, upper-cased as directories key on it case-insensitively.
    pub app: String,
    pub host_name: String,
    pub ip_addr: String,
    pub vip_address: String,
    pub secure_vip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asg_name: Option<String>,
    pub status: InstanceStatus,
    pub port: PortSpec,
    pub secure_port: PortSpec,
    pub lease_info: LeaseInfo,
    pub metadata: Metadata,
    pub data_center_info: DataCenterPayload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: u16,
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseInfo {
    pub renewal_interval_in_secs: u32,
    pub duration_in_secs: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCenterPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl RegistrationPayload {
    /// Assemble a payload from the static instance config and the values sampled for this send.
    pub fn from_parts(
        config: &dyn InstanceConfig,
        instance_id: String,
        host_name: String,
        status: InstanceStatus,
        metadata: Metadata,
    ) -> Self {
        let dc = config.data_center_info();
        Self {
            instance_id,
            app: config.app_name().to_ascii_uppercase(),
            host_name,
            ip_addr: config.ip_address().to_string(),
            vip_address: config.virtual_host_name().to_string(),
            secure_vip_address: config.secure_virtual_host_name().to_string(),
            asg_name: config.asg_name().map(str::to_string),
            status,
            port: PortSpec {
                port: config.non_secure_port(),
                enabled: config.is_non_secure_port_enabled(),
            },
            secure_port: PortSpec {
                port: config.secure_port(),
                enabled: config.is_secure_port_enabled(),
            },
            lease_info: LeaseInfo {
                renewal_interval_in_secs: config.lease_renewal_interval_secs(),
                duration_in_secs: config.lease_expiration_duration_secs(),
            },
            metadata,
            data_center_info: DataCenterPayload {
                name: dc.name().to_string(),
                metadata: dc.describe(),
            },
        }
    }
}
