use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tether_core::{HeartbeatOutcome, LeaseSubscriber, MetricsHandle};
use tether_model::{InstanceConfig, LeaseEvent, LeaseState};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::payload::PayloadSource;
use crate::{
    config::DiscoverConfig,
    errors::DiscoverError,
    transport::{DiscoveryTransport, RenewalStatus},
};

/// Mutable lease bookkeeping; never held across an `.await`.
pub(crate) struct LeaseTracker {
    pub(crate) state: LeaseState,
    pub(crate) consecutive_failures: u32,
    pub(crate) last_renewal: Option<Instant>,
    /// Start of the current expiration window: last renewal, or the last `start()`.
    pub(crate) anchor: Instant,
    pub(crate) started: bool,
}

/// Result of one heartbeat tick.
enum Renewal {
    Renewed,
    Reregistered,
    Failed(DiscoverError),
}

/// State shared between the scheduler handle and its heartbeat worker.
pub(crate) struct LeaseCore {
    pub(crate) source: PayloadSource,
    pub(crate) transport: Arc<dyn DiscoveryTransport>,
    pub(crate) subscribers: Vec<Arc<dyn LeaseSubscriber>>,
    pub(crate) metrics: MetricsHandle,
    pub(crate) config: DiscoverConfig,
    pub(crate) lease: Mutex<LeaseTracker>,
    /// Held for the whole of every heartbeat or registration so sends never overlap.
    pub(crate) send_lock: tokio::sync::Mutex<()>,
    /// Cancelled by `stop()`; aborts an explicit registration still in flight.
    pub(crate) shutdown: CancellationToken,
}

impl LeaseCore {
    pub(crate) fn lock(&self) -> MutexGuard<'_, LeaseTracker> {
        self.lease.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn renewal_interval(&self) -> Duration {
        self.source.descriptor.lease_renewal_interval()
    }

    fn deadline(&self) -> Instant {
        self.lock().anchor + self.source.descriptor.lease_expiration_duration()
    }

    pub(crate) fn emit(&self, event: LeaseEvent) {
        for subscriber in &self.subscribers {
            subscriber.on_event(&event);
        }
    }

    /// Heartbeat loop. Ticks are strictly sequential; the next one is scheduled a renewal
    /// interval after the previous attempt finished.
    pub(crate) async fn run(self: Arc<Self>, cancel: CancellationToken) {
        self.emit(LeaseEvent::Started);

        loop {
            let deadline = self.deadline();
            let renewal = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = sleep_until(deadline) => {
                    if self.expire() {
                        return;
                    }
                    continue;
                }
                renewal = self.renew() => renewal,
            };
            if !self.apply(renewal) {
                return;
            }

            let next = Instant::now() + self.renewal_interval();
            loop {
                let deadline = self.deadline();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    _ = sleep_until(deadline) => {
                        if self.expire() {
                            return;
                        }
                    }
                    _ = sleep_until(next) => break,
                }
            }
        }
    }

    async fn renew(&self) -> Renewal {
        let _send = self.send_lock.lock().await;
        let status = match self.send_heartbeat().await {
            Ok(status) => status,
            Err(e) => {
                self.metrics.record_heartbeat(HeartbeatOutcome::Transient);
                return Renewal::Failed(e);
            }
        };

        match status {
            RenewalStatus::Renewed => {
                self.metrics.record_heartbeat(HeartbeatOutcome::Success);
                debug!("lease renewed");

                if self.source.status_changed() {
                    info!("instance status changed, refreshing registration");
                    if let Err(e) = self.register(false).await {
                        warn!("status refresh failed, retrying next tick: {e}");
                    }
                }
                Renewal::Renewed
            }
            RenewalStatus::NotFound => {
                self.metrics.record_heartbeat(HeartbeatOutcome::NotFound);
                warn!("directory has no lease for this instance, re-registering");
                self.emit(LeaseEvent::ReregistrationRequested);

                match self.register(true).await {
                    Ok(()) => Renewal::Reregistered,
                    Err(e) => Renewal::Failed(e),
                }
            }
        }
    }

    async fn send_heartbeat(&self) -> Result<RenewalStatus, DiscoverError> {
        let instance_id = self.source.instance_id().await?;
        let limit = self.config.heartbeat_timeout();

        timeout(limit, self.transport.heartbeat(self.source.app(), instance_id))
            .await
            .map_err(|_| DiscoverError::Timeout {
                operation: "heartbeat",
                timeout: limit,
            })?
    }

    /// Send a registration; `refresh_hostname` re-resolves the hostname first.
    pub(crate) async fn register(&self, refresh_hostname: bool) -> Result<(), DiscoverError> {
        let limit = self.config.registration_timeout();
        let result = async {
            let payload = self.source.build(refresh_hostname).await?;
            timeout(limit, self.transport.register(&payload))
                .await
                .map_err(|_| DiscoverError::Timeout {
                    operation: "registration",
                    timeout: limit,
                })??;
            Ok::<_, DiscoverError>(payload.status)
        }
        .await;

        self.metrics.record_registration(result.is_ok());
        let status = result?;
        self.source.record_registered(status);

        info!(app = self.source.app(), status = ?status, "instance registered");
        self.emit(LeaseEvent::Registered);
        Ok(())
    }

    /// Fold a tick result into the tracker. Returns `false` when the worker must exit.
    fn apply(&self, renewal: Renewal) -> bool {
        let failures = {
            let mut lease = self.lock();
            if lease.state != LeaseState::Active {
                return false;
            }
            match renewal {
                Renewal::Renewed | Renewal::Reregistered => {
                    let now = Instant::now();
                    lease.consecutive_failures = 0;
                    lease.last_renewal = Some(now);
                    lease.anchor = now;
                }
                Renewal::Failed(e) => {
                    lease.consecutive_failures += 1;
                    warn!(
                        consecutive_failures = lease.consecutive_failures,
                        "heartbeat failed, retrying next tick: {e}"
                    );
                }
            }
            lease.consecutive_failures
        };
        self.metrics.set_consecutive_failures(failures);
        true
    }

    /// Record a renewal that happened outside the worker (explicit registration).
    ///
    /// Returns the current state as an error if the lease was stopped in the meantime.
    pub(crate) fn mark_renewed(&self) -> Result<(), LeaseState> {
        let mut lease = self.lock();
        if lease.state.is_terminal() {
            return Err(lease.state);
        }
        let now = Instant::now();
        lease.consecutive_failures = 0;
        lease.last_renewal = Some(now);
        lease.anchor = now;
        drop(lease);
        self.metrics.set_consecutive_failures(0);
        Ok(())
    }

    /// Move to `LeaseLost` if the expiration window has run out.
    ///
    /// Returns `true` when the worker must exit. The window may have moved if an explicit
    /// registration renewed the lease while the worker was waiting.
    fn expire(&self) -> bool {
        let (since, failures) = {
            let mut lease = self.lock();
            if lease.state != LeaseState::Active {
                return true;
            }
            if Instant::now() < lease.anchor + self.source.descriptor.lease_expiration_duration() {
                return false;
            }
            lease.state = LeaseState::LeaseLost;
            (lease.anchor.elapsed(), lease.consecutive_failures)
        };

        error!(
            since_last_renewal_ms = since.as_millis() as u64,
            consecutive_failures = failures,
            "lease expired locally, heartbeats paused until re-registration"
        );
        self.metrics.record_state(LeaseState::LeaseLost);
        self.emit(LeaseEvent::LeaseLost {
            since_last_renewal: since,
        });
        true
    }

    /// Best-effort removal from the directory; bounded and never fails the caller.
    pub(crate) async fn deregister(&self) {
        let limit = self.config.deregistration_timeout();
        let attempt = async {
            let instance_id = self.source.instance_id().await?;
            self.transport
                .deregister(self.source.app(), instance_id)
                .await
        };

        let result = match timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => Err(DiscoverError::Timeout {
                operation: "deregistration",
                timeout: limit,
            }),
        };

        self.metrics.record_deregistration(result.is_ok());
        match result {
            Ok(()) => info!(app = self.source.app(), "instance deregistered"),
            Err(e) => warn!(app = self.source.app(), "deregistration failed: {e}"),
        }
    }
}
