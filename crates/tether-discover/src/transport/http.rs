use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tether_model::RegistrationPayload;
use tracing::trace;

use super::{DiscoveryTransport, RenewalStatus};
use crate::{config::DiscoverConfig, errors::DiscoverError};

/// REST transport: `POST /apps/{APP}`, `PUT /apps/{APP}/{id}`, `DELETE /apps/{APP}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    instance: &'a RegistrationPayload,
}

impl HttpTransport {
    pub fn new(config: &DiscoverConfig) -> Result<Self, DiscoverError> {
        config.validate()?;
        Ok(Self::with_client(Client::builder().build()?, &config.service_url))
    }

    pub fn with_client(client: Client, service_url: &str) -> Self {
        Self {
            client,
            base_url: service_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn app_url(&self, app: &str) -> String {
        format!("{}/apps/{}", self.base_url, app.to_ascii_uppercase())
    }

    fn instance_url(&self, app: &str, instance_id: &str) -> String {
        format!("{}/{}", self.app_url(app), instance_id)
    }
}

#[async_trait]
impl DiscoveryTransport for HttpTransport {
    async fn register(&self, payload: &RegistrationPayload) -> Result<(), DiscoverError> {
        let url = self.app_url(&payload.app);
        trace!(%url, "posting registration");

        let response = self
            .client
            .post(url)
            .json(&Envelope { instance: payload })
            .send()
            .await?;
        expect_success(response).await
    }

    async fn heartbeat(
        &self,
        app: &str,
        instance_id: &str,
    ) -> Result<RenewalStatus, DiscoverError> {
        let response = self
            .client
            .put(self.instance_url(app, instance_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(RenewalStatus::NotFound);
        }
        expect_success(response).await?;
        Ok(RenewalStatus::Renewed)
    }

    async fn deregister(&self, app: &str, instance_id: &str) -> Result<(), DiscoverError> {
        let response = self
            .client
            .delete(self.instance_url(app, instance_id))
            .send()
            .await?;

        // Already gone is as good as removed.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response).await
    }
}

async fn expect_success(response: Response) -> Result<(), DiscoverError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(DiscoverError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_app_layout() {
        let transport = HttpTransport::with_client(Client::new(), "http://dir:8761/eureka/");

        assert_eq!(transport.app_url("billing"), "http://dir:8761/eureka/apps/BILLING");
        assert_eq!(
            transport.instance_url("billing", "host-1"),
            "http://dir:8761/eureka/apps/BILLING/host-1"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = HttpTransport::new(&DiscoverConfig::new("ftp://dir")).unwrap_err();
        assert!(matches!(err, DiscoverError::InvalidConfig(_)));
    }

    #[test]
    fn registration_is_wrapped_in_instance_envelope() {
        use tether_model::{InstanceDescriptor, InstanceSettings, InstanceStatus, Metadata};

        let d = InstanceDescriptor::new(InstanceSettings::new("svc")).unwrap();
        let payload = RegistrationPayload::from_parts(
            &d,
            "id".into(),
            "host".into(),
            InstanceStatus::Up,
            Metadata::new(),
        );
        let json = serde_json::to_value(Envelope { instance: &payload }).unwrap();
        assert_eq!(json["instance"]["app"], "SVC");
    }
}
