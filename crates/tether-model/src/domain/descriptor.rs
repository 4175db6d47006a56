use std::time::Duration;

use crate::{ConfigError, DataCenterInfo, InstanceSettings, Metadata};

/// Read-only view over an instance's identity and lease parameters.
///
/// Everything a registration or heartbeat needs to know about the instance itself.
/// Implementors must not mutate after construction.
pub trait InstanceConfig: Send + Sync {
    fn app_name(&self) -> &str;
    fn instance_id(&self) -> Option<&str>;
    fn is_instance_enabled_on_init(&self) -> bool;
    fn non_secure_port(&self) -> u16;
    fn is_non_secure_port_enabled(&self) -> bool;
    fn secure_port(&self) -> u16;
    fn is_secure_port_enabled(&self) -> bool;
    fn lease_renewal_interval_secs(&self) -> u32;
    fn lease_expiration_duration_secs(&self) -> u32;
    fn virtual_host_name(&self) -> &str;
    fn secure_virtual_host_name(&self) -> &str;
    fn asg_name(&self) -> Option<&str>;
    fn ip_address(&self) -> &str;
    fn data_center_info(&self) -> &DataCenterInfo;

    #[inline]
    fn lease_renewal_interval(&self) -> Duration {
        Duration::from_secs(self.lease_renewal_interval_secs().into())
    }

    #[inline]
    fn lease_expiration_duration(&self) -> Duration {
        Duration::from_secs(self.lease_expiration_duration_secs().into())
    }
}

/// Validated identity snapshot of the running instance.
///
/// Built once at startup; see [`InstanceDescriptor::new`] for the rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDescriptor {
    app_name: String,
    instance_id: Option<String>,
    enabled_on_init: bool,
    non_secure_port: u16,
    non_secure_port_enabled: bool,
    secure_port: u16,
    secure_port_enabled: bool,
    renewal_secs: u32,
    expiration_secs: u32,
    virtual_host_name: String,
    secure_virtual_host_name: String,
    asg_name: Option<String>,
    ip_address: String,
    data_center: DataCenterInfo,
    initial_metadata: Metadata,
}

impl InstanceDescriptor {
    /// Validate settings and freeze them.
    ///
    /// Fails when the app name is blank, no port is enabled, an enabled port is 0,
    /// the renewal interval is 0, or the expiration does not exceed the renewal interval.
    pub fn new(settings: InstanceSettings) -> Result<Self, ConfigError> {
        let app_name = settings.app_name.trim().to_string();
        if app_name.is_empty() {
            return Err(ConfigError::EmptyAppName);
        }

        if !settings.non_secure_port_enabled && !settings.secure_port_enabled {
            return Err(ConfigError::NoPortEnabled);
        }
        if settings.non_secure_port_enabled && settings.non_secure_port == 0 {
            return Err(ConfigError::InvalidPort { name: "non-secure" });
        }
        if settings.secure_port_enabled && settings.secure_port == 0 {
            return Err(ConfigError::InvalidPort { name: "secure" });
        }

        let renewal_secs = settings.lease_renewal_interval_secs;
        let expiration_secs = settings.lease_expiration_duration_secs;
        if renewal_secs == 0 {
            return Err(ConfigError::ZeroRenewalInterval);
        }
        if expiration_secs <= renewal_secs {
            return Err(ConfigError::ExpirationNotAfterRenewal {
                renewal_secs,
                expiration_secs,
            });
        }

        settings.data_center.validate()?;

        let default_vip = app_name.to_ascii_lowercase();
        let virtual_host_name =
            non_blank(settings.virtual_host_name).unwrap_or_else(|| default_vip.clone());
        let secure_virtual_host_name =
            non_blank(settings.secure_virtual_host_name).unwrap_or(default_vip);

        Ok(Self {
            app_name,
            instance_id: settings.instance_id.and_then(non_blank),
            enabled_on_init: settings.instance_enabled_on_init,
            non_secure_port: settings.non_secure_port,
            non_secure_port_enabled: settings.non_secure_port_enabled,
            secure_port: settings.secure_port,
            secure_port_enabled: settings.secure_port_enabled,
            renewal_secs,
            expiration_secs,
            virtual_host_name,
            secure_virtual_host_name,
            asg_name: non_blank(settings.asg_name),
            ip_address: settings.ip_address,
            data_center: settings.data_center,
            initial_metadata: settings.metadata,
        })
    }

    /// Metadata the instance was configured with; seeds the live metadata store.
    pub fn initial_metadata(&self) -> &Metadata {
        &self.initial_metadata
    }
}

impl TryFrom<InstanceSettings> for InstanceDescriptor {
    type Error = ConfigError;

    fn try_from(settings: InstanceSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

impl InstanceConfig for InstanceDescriptor {
    fn app_name(&self) -> &str {
        &self.app_name
    }
    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
    fn is_instance_enabled_on_init(&self) -> bool {
        self.enabled_on_init
    }
    fn non_secure_port(&self) -> u16 {
        self.non_secure_port
    }
    fn is_non_secure_port_enabled(&self) -> bool {
        self.non_secure_port_enabled
    }
    fn secure_port(&self) -> u16 {
        self.secure_port
    }
    fn is_secure_port_enabled(&self) -> bool {
        self.secure_port_enabled
    }
    fn lease_renewal_interval_secs(&self) -> u32 {
        self.renewal_secs
    }
    fn lease_expiration_duration_secs(&self) -> u32 {
        self.expiration_secs
    }
    fn virtual_host_name(&self) -> &str {
        &self.virtual_host_name
    }
    fn secure_virtual_host_name(&self) -> &str {
        &self.secure_virtual_host_name
    }
    fn asg_name(&self) -> Option<&str> {
        self.asg_name.as_deref()
    }
    fn ip_address(&self) -> &str {
        &self.ip_address
    }
    fn data_center_info(&self) -> &DataCenterInfo {
        &self.data_center
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
