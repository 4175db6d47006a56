use std::sync::{Arc, Mutex, PoisonError};

use tether_core::{HealthCheck, HostnameResolver, MetadataStore, MetricsHandle};
use tether_model::{InstanceConfig, InstanceDescriptor, InstanceStatus, RegistrationPayload};
use tokio::sync::OnceCell;
use tracing::warn;

use crate::errors::DiscoverError;

/// Everything needed to describe the instance to the directory.
pub(crate) struct PayloadSource {
    pub(crate) descriptor: Arc<InstanceDescriptor>,
    pub(crate) metadata: MetadataStore,
    pub(crate) resolver: Arc<HostnameResolver>,
    pub(crate) health: Option<Arc<dyn HealthCheck>>,
    pub(crate) metrics: MetricsHandle,
    instance_id: OnceCell<String>,
    /// Status carried by the last accepted registration.
    registered_status: Mutex<Option<InstanceStatus>>,
}

impl PayloadSource {
    pub(crate) fn new(
        descriptor: Arc<InstanceDescriptor>,
        metadata: MetadataStore,
        resolver: Arc<HostnameResolver>,
        health: Option<Arc<dyn HealthCheck>>,
        metrics: MetricsHandle,
    ) -> Self {
        Self {
            descriptor,
            metadata,
            resolver,
            health,
            metrics,
            instance_id: OnceCell::new(),
            registered_status: Mutex::new(None),
        }
    }

    pub(crate) fn app(&self) -> &str {
        self.descriptor.app_name()
    }

    /// Id the lease is keyed on: explicit id, cloud instance id, or hostname.
    ///
    /// Fixed after the first call so heartbeats and deregistration address the lease that
    /// was registered even if the hostname later changes.
    pub(crate) async fn instance_id(&self) -> Result<&str, DiscoverError> {
        let id = self
            .instance_id
            .get_or_try_init(|| async {
                if let Some(id) = self.descriptor.instance_id() {
                    return Ok::<_, DiscoverError>(id.to_string());
                }
                if let Some(id) = self.descriptor.data_center_info().instance_id() {
                    return Ok(id.to_string());
                }
                Ok(self.resolver.cached().await?)
            })
            .await?;
        Ok(id.as_str())
    }

    pub(crate) fn status(&self) -> InstanceStatus {
        let healthy = self.health.as_ref().map(|h| h.is_healthy());
        InstanceStatus::resolve(self.descriptor.is_instance_enabled_on_init(), healthy)
    }

    /// Returns `true` if the directory holds a registration whose status is now outdated.
    pub(crate) fn status_changed(&self) -> bool {
        let current = self.status();
        self.registered_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|sent| sent != current)
    }

    pub(crate) fn record_registered(&self, status: InstanceStatus) {
        *self
            .registered_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Build a registration payload; `refresh_hostname` forces a new hostname lookup.
    pub(crate) async fn build(
        &self,
        refresh_hostname: bool,
    ) -> Result<RegistrationPayload, DiscoverError> {
        let instance_id = self.instance_id().await?.to_string();

        let resolution = self.resolver.resolve(refresh_hostname).await?;
        if refresh_hostname {
            self.metrics.record_hostname_refresh(!resolution.is_stale());
        }
        if let Some(e) = &resolution.stale {
            warn!(hostname = %resolution.hostname, "registering with stale hostname: {e}");
        }

        Ok(RegistrationPayload::from_parts(
            self.descriptor.as_ref(),
            instance_id,
            resolution.hostname,
            self.status(),
            self.metadata.snapshot(),
        ))
    }
}
