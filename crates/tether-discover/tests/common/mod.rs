#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tether_core::{HostnameResolver, HostnameSource, LeaseSubscriber, ResolveError};
use tether_discover::{DiscoverError, DiscoveryTransport, LeaseScheduler, RenewalStatus};
use tether_model::{InstanceDescriptor, InstanceSettings, LeaseEvent, RegistrationPayload};
use tokio::{sync::Notify, time::Instant};

/// How the fake directory answers heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Renew,
    Fail,
    NotFound,
    /// Never answers.
    Hang,
    /// Answers `Renewed` after the given delay.
    Slow(Duration),
}

pub struct MockTransport {
    mode: Mutex<Mode>,
    heartbeats: AtomicUsize,
    deregistrations: AtomicUsize,
    heartbeat_times: Mutex<Vec<Instant>>,
    registrations: Mutex<Vec<RegistrationPayload>>,
    register_delay: Mutex<Option<Duration>>,
    register_fails: AtomicBool,
    deregister_hangs: AtomicBool,
    pub heartbeat_started: Notify,
}

impl MockTransport {
    pub fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            heartbeats: AtomicUsize::new(0),
            deregistrations: AtomicUsize::new(0),
            heartbeat_times: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            register_delay: Mutex::new(None),
            register_fails: AtomicBool::new(false),
            deregister_hangs: AtomicBool::new(false),
            heartbeat_started: Notify::new(),
        })
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Registrations complete only after `delay`.
    pub fn set_register_delay(&self, delay: Duration) {
        *self.register_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_register_fails(&self, fails: bool) {
        self.register_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_deregister_hangs(&self, hangs: bool) {
        self.deregister_hangs.store(hangs, Ordering::SeqCst);
    }

    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    pub fn deregistrations(&self) -> usize {
        self.deregistrations.load(Ordering::SeqCst)
    }

    pub fn heartbeat_times(&self) -> Vec<Instant> {
        self.heartbeat_times.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> Vec<RegistrationPayload> {
        self.registrations.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoveryTransport for MockTransport {
    /// Only registrations that complete are recorded.
    async fn register(&self, payload: &RegistrationPayload) -> Result<(), DiscoverError> {
        let delay = *self.register_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.register_fails.load(Ordering::SeqCst) {
            return Err(DiscoverError::UnexpectedStatus {
                status: 500,
                body: "registry unavailable".into(),
            });
        }
        self.registrations.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn heartbeat(
        &self,
        _app: &str,
        _instance_id: &str,
    ) -> Result<RenewalStatus, DiscoverError> {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        self.heartbeat_times.lock().unwrap().push(Instant::now());
        self.heartbeat_started.notify_one();

        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::Renew => Ok(RenewalStatus::Renewed),
            Mode::NotFound => Ok(RenewalStatus::NotFound),
            Mode::Fail => Err(DiscoverError::UnexpectedStatus {
                status: 503,
                body: "unavailable".into(),
            }),
            Mode::Hang => std::future::pending().await,
            Mode::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(RenewalStatus::Renewed)
            }
        }
    }

    async fn deregister(&self, _app: &str, _instance_id: &str) -> Result<(), DiscoverError> {
        self.deregistrations.fetch_add(1, Ordering::SeqCst);
        if self.deregister_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

/// Collects every emitted event.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<LeaseEvent>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<LeaseEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&LeaseEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn lease_lost(&self) -> usize {
        self.count(|e| matches!(e, LeaseEvent::LeaseLost { .. }))
    }
}

impl LeaseSubscriber for Recorder {
    fn on_event(&self, event: &LeaseEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Hostname source returning a fixed name.
pub struct FixedHost(pub &'static str);

#[async_trait]
impl HostnameSource for FixedHost {
    async fn lookup(&self) -> Result<String, ResolveError> {
        Ok(self.0.to_string())
    }
}

/// Hostname source answering `host-<n>` on the n-th lookup.
#[derive(Default)]
pub struct CountingHost(AtomicUsize);

impl CountingHost {
    pub fn lookups(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostnameSource for CountingHost {
    async fn lookup(&self) -> Result<String, ResolveError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("host-{n}"))
    }
}

pub fn settings(renewal: u32, expiration: u32) -> InstanceSettings {
    InstanceSettings::new("orders")
        .with_lease(renewal, expiration)
        .with_enabled_on_init(true)
}

pub fn scheduler(
    settings: InstanceSettings,
    transport: Arc<MockTransport>,
    recorder: Arc<Recorder>,
) -> LeaseScheduler {
    let descriptor = InstanceDescriptor::new(settings).unwrap();
    LeaseScheduler::builder(descriptor, transport)
        .resolver(Arc::new(HostnameResolver::new(Arc::new(FixedHost("host-1")))))
        .subscriber(recorder)
        .build()
        .unwrap()
}

pub async fn advance(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
