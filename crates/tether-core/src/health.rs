use std::sync::atomic::{AtomicBool, Ordering};

/// Gate consulted before advertising an instance that was not enabled on init.
pub trait HealthCheck: Send + Sync {
    fn is_healthy(&self) -> bool;
}

impl<F> HealthCheck for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_healthy(&self) -> bool {
        self()
    }
}

/// Health flag flipped by the application.
#[derive(Debug, Default)]
pub struct StaticHealth {
    healthy: AtomicBool,
}

impl StaticHealth {
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: AtomicBool::new(healthy),
        }
    }

    pub fn set(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Release);
    }
}

impl HealthCheck for StaticHealth {
    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }
}
