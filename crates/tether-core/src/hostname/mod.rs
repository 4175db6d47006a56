mod source;
pub use source::{HostnameSource, SystemHostname};

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, SystemTime},
};

use tracing::{debug, warn};

use crate::error::ResolveError;

/// Upper bound for a single lookup unless configured otherwise.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Caches the instance's hostname.
///
/// The cache only changes through an explicit refresh: [`cached`](Self::cached) resolves
/// at most once, [`refresh`](Self::refresh) always performs a new lookup. Lookups are
/// bounded by a timeout and run one at a time, without holding the cache lock.
pub struct HostnameResolver {
    source: Arc<dyn HostnameSource>,
    timeout: Duration,
    cache: Mutex<Option<CachedHostname>>,
    lookups: tokio::sync::Mutex<()>,
}

#[derive(Clone, Debug)]
struct CachedHostname {
    value: String,
    resolved_at: SystemTime,
}

/// Hostname handed back by the resolver.
#[derive(Debug)]
pub struct Resolution {
    pub hostname: String,
    /// Set when a forced refresh failed and `hostname` is the previously cached value.
    pub stale: Option<ResolveError>,
}

impl Resolution {
    pub fn is_stale(&self) -> bool {
        self.stale.is_some()
    }
}

impl HostnameResolver {
    pub fn new(source: Arc<dyn HostnameSource>) -> Self {
        Self::with_timeout(source, DEFAULT_RESOLVE_TIMEOUT)
    }

    pub fn with_timeout(source: Arc<dyn HostnameSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            cache: Mutex::new(None),
            lookups: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolver backed by the operating system hostname.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemHostname))
    }

    /// Resolve the hostname.
    ///
    /// With `force_refresh == false` the cached value is returned when present. With
    /// `force_refresh == true` a lookup always runs; if it fails and a value is cached, that
    /// value comes back marked [`stale`](Resolution::stale). Errors only when nothing is
    /// cached and the lookup fails.
    pub async fn resolve(&self, force_refresh: bool) -> Result<Resolution, ResolveError> {
        if !force_refresh && let Some(hostname) = self.peek() {
            return Ok(Resolution {
                hostname,
                stale: None,
            });
        }

        let _lookup = self.lookups.lock().await;
        // Another caller may have filled the cache while we waited.
        if !force_refresh && let Some(hostname) = self.peek() {
            return Ok(Resolution {
                hostname,
                stale: None,
            });
        }

        match self.lookup().await {
            Ok(hostname) => {
                self.store(&hostname);
                debug!(hostname = %hostname, force_refresh, "hostname resolved");
                Ok(Resolution {
                    hostname,
                    stale: None,
                })
            }
            Err(e) => match self.peek() {
                Some(hostname) => {
                    warn!(hostname = %hostname, "hostname refresh failed, keeping cached value: {e}");
                    Ok(Resolution {
                        hostname,
                        stale: Some(e),
                    })
                }
                None => Err(e),
            },
        }
    }

    /// Cached hostname, resolving once if the cache is empty.
    pub async fn cached(&self) -> Result<String, ResolveError> {
        self.resolve(false).await.map(|r| r.hostname)
    }

    /// Force a new lookup. See [`resolve`](Self::resolve).
    pub async fn refresh(&self) -> Result<Resolution, ResolveError> {
        self.resolve(true).await
    }

    /// Cached value without triggering a lookup.
    pub fn peek(&self) -> Option<String> {
        self.lock().as_ref().map(|c| c.value.clone())
    }

    /// When the cached value was last successfully resolved.
    pub fn last_resolved_at(&self) -> Option<SystemTime> {
        self.lock().as_ref().map(|c| c.resolved_at)
    }

    async fn lookup(&self) -> Result<String, ResolveError> {
        let name = tokio::time::timeout(self.timeout, self.source.lookup())
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout))??;

        let name = name.trim();
        if name.is_empty() {
            return Err(ResolveError::Empty);
        }
        Ok(name.to_string())
    }

    fn store(&self, hostname: &str) {
        *self.lock() = Some(CachedHostname {
            value: hostname.to_string(),
            resolved_at: SystemTime::now(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CachedHostname>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
