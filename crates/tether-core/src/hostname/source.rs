use async_trait::async_trait;

use crate::error::ResolveError;

/// Where hostnames come from.
#[async_trait]
pub trait HostnameSource: Send + Sync {
    async fn lookup(&self) -> Result<String, ResolveError>;
}

/// Operating system hostname, looked up on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostname;

#[async_trait]
impl HostnameSource for SystemHostname {
    async fn lookup(&self) -> Result<String, ResolveError> {
        let name = tokio::task::spawn_blocking(::hostname::get)
            .await
            .map_err(|e| ResolveError::Aborted(e.to_string()))??;
        name.into_string().map_err(|_| ResolveError::NotUnicode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn system_hostname_is_not_empty() {
        let name = SystemHostname.lookup().await.unwrap();
        assert!(!name.trim().is_empty());
    }
}
