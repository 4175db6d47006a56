use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tether_core::{
    HealthCheck, HostnameResolver, LeaseSubscriber, MetadataStore, MetricsHandle, NoopMetrics,
};
use tether_model::{InstanceConfig, InstanceDescriptor, LeaseEvent, LeaseState};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{
    heartbeat::{LeaseCore, LeaseTracker},
    payload::PayloadSource,
};
use crate::{config::DiscoverConfig, errors::DiscoverError, transport::DiscoveryTransport};

/// Keeps the instance's lease alive in the discovery directory.
///
/// `Pending -> Active -> LeaseLost -> Stopped`. [`start`](Self::start) spawns one
/// heartbeat worker on the current tokio runtime; [`stop`](Self::stop) cancels it,
/// waits for it to exit and deregisters the instance.
pub struct LeaseScheduler {
    core: Arc<LeaseCore>,
    worker: Mutex<Option<Worker>>,
}

struct Worker {
    cancel: CancellationToken,
    /// Cancelled when the worker task has exited.
    done: CancellationToken,
}

impl LeaseScheduler {
    pub fn builder(
        descriptor: InstanceDescriptor,
        transport: Arc<dyn DiscoveryTransport>,
    ) -> LeaseSchedulerBuilder {
        LeaseSchedulerBuilder::new(descriptor, transport)
    }

    /// Begin heartbeating. Allowed from `Pending` and `LeaseLost`.
    ///
    /// The first heartbeat goes out immediately.
    #[instrument(level = "debug", skip(self), fields(app = self.core.source.app()))]
    pub fn start(&self) -> Result<(), DiscoverError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DiscoverError::NoRuntime)?;

        let mut worker = self.worker();
        {
            let mut lease = self.core.lock();
            if !lease.state.can_start() {
                return Err(DiscoverError::InvalidTransition {
                    action: "start",
                    state: lease.state,
                });
            }
            lease.state = LeaseState::Active;
            lease.consecutive_failures = 0;
            lease.anchor = Instant::now();
            lease.started = true;
        }

        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let guard = done.clone().drop_guard();
        let core = Arc::clone(&self.core);
        let token = cancel.clone();
        runtime.spawn(async move {
            let _guard = guard;
            core.run(token).await;
        });
        *worker = Some(Worker { cancel, done });
        drop(worker);

        info!(
            renewal_secs = self.core.source.descriptor.lease_renewal_interval_secs(),
            expiration_secs = self.core.source.descriptor.lease_expiration_duration_secs(),
            "lease scheduler started"
        );
        self.core.metrics.record_state(LeaseState::Active);
        Ok(())
    }

    /// Stop heartbeating and deregister.
    ///
    /// Idempotent. Once this returns nothing more is sent to the directory besides the
    /// deregistration, which is best-effort and bounded by the configured timeout. An
    /// explicit [`register`](Self::register) still in flight is aborted.
    #[instrument(level = "debug", skip(self), fields(app = self.core.source.app()))]
    pub async fn stop(&self) {
        let (previous, started, done) = {
            let worker = self.worker();
            let mut lease = self.core.lock();
            let previous = lease.state;
            lease.state = LeaseState::Stopped;
            self.core.shutdown.cancel();
            let done = worker.as_ref().map(|w| {
                w.cancel.cancel();
                w.done.clone()
            });
            (previous, lease.started, done)
        };

        if let Some(done) = done {
            done.cancelled().await;
        }
        // Wait out any registration that was aborted above.
        let _send = self.core.send_lock.lock().await;
        if previous == LeaseState::Stopped {
            return;
        }

        info!(previous = %previous, "lease scheduler stopping");
        self.core.metrics.record_state(LeaseState::Stopped);
        if started {
            self.core.deregister().await;
        }
        self.core.emit(LeaseEvent::Stopped);
    }

    /// Register right away, e.g. after a lease loss and before [`start`](Self::start).
    ///
    /// Success counts as a renewal. Never overlaps a heartbeat tick. Fails with
    /// [`DiscoverError::InvalidTransition`] once the scheduler is stopped, including when
    /// [`stop`](Self::stop) runs while the registration is in flight.
    pub async fn register(&self) -> Result<(), DiscoverError> {
        let _send = self.core.send_lock.lock().await;
        let state = self.state();
        if state.is_terminal() {
            return Err(DiscoverError::InvalidTransition {
                action: "register",
                state,
            });
        }

        tokio::select! {
            biased;
            _ = self.core.shutdown.cancelled() => {
                return Err(DiscoverError::InvalidTransition {
                    action: "register",
                    state: LeaseState::Stopped,
                });
            }
            result = self.core.register(false) => result?,
        }
        self.core
            .mark_renewed()
            .map_err(|state| DiscoverError::InvalidTransition {
                action: "register",
                state,
            })
    }

    pub fn state(&self) -> LeaseState {
        self.core.lock().state
    }

    /// Failed ticks since the last successful renewal.
    pub fn consecutive_failures(&self) -> u32 {
        self.core.lock().consecutive_failures
    }

    pub fn last_renewal(&self) -> Option<Instant> {
        self.core.lock().last_renewal
    }

    pub fn descriptor(&self) -> &InstanceDescriptor {
        &self.core.source.descriptor
    }

    /// Live metadata sent with every registration.
    pub fn metadata(&self) -> &MetadataStore {
        &self.core.source.metadata
    }

    pub fn resolver(&self) -> &HostnameResolver {
        &self.core.source.resolver
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LeaseScheduler {
    fn drop(&mut self) {
        if let Some(worker) = self.worker().as_ref() {
            worker.cancel.cancel();
        }
    }
}

/// Builder for [`LeaseScheduler`].
pub struct LeaseSchedulerBuilder {
    descriptor: InstanceDescriptor,
    transport: Arc<dyn DiscoveryTransport>,
    config: DiscoverConfig,
    metadata: Option<MetadataStore>,
    resolver: Option<Arc<HostnameResolver>>,
    health: Option<Arc<dyn HealthCheck>>,
    subscribers: Vec<Arc<dyn LeaseSubscriber>>,
    metrics: Option<MetricsHandle>,
}

impl LeaseSchedulerBuilder {
    fn new(descriptor: InstanceDescriptor, transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            descriptor,
            transport,
            config: DiscoverConfig::default(),
            metadata: None,
            resolver: None,
            health: None,
            subscribers: Vec::new(),
            metrics: None,
        }
    }

    pub fn config(mut self, config: DiscoverConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing metadata store. By default one is seeded from the descriptor.
    pub fn metadata(mut self, metadata: MetadataStore) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Hostname resolver. Defaults to the operating system hostname.
    pub fn resolver(mut self, resolver: Arc<HostnameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Health gate used when the instance is not enabled on init.
    pub fn health_check(mut self, health: Arc<dyn HealthCheck>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn subscriber(mut self, subscriber: Arc<dyn LeaseSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<LeaseScheduler, DiscoverError> {
        self.config.validate()?;

        let metrics = self.metrics.unwrap_or_else(NoopMetrics::handle);
        let metadata = self
            .metadata
            .unwrap_or_else(|| MetadataStore::with_entries(self.descriptor.initial_metadata()));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(HostnameResolver::system()));

        let source = PayloadSource::new(
            Arc::new(self.descriptor),
            metadata,
            resolver,
            self.health,
            Arc::clone(&metrics),
        );
        let core = LeaseCore {
            source,
            transport: self.transport,
            subscribers: self.subscribers,
            metrics,
            config: self.config,
            lease: Mutex::new(LeaseTracker {
                state: LeaseState::Pending,
                consecutive_failures: 0,
                last_renewal: None,
                anchor: Instant::now(),
                started: false,
            }),
            send_lock: tokio::sync::Mutex::new(()),
            shutdown: CancellationToken::new(),
        };

        Ok(LeaseScheduler {
            core: Arc::new(core),
            worker: Mutex::new(None),
        })
    }
}
