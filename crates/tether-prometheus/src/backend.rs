use prometheus::{IntCounterVec, IntGauge, Opts, Registry, proto::MetricFamily};
use tether_core::{HeartbeatOutcome, MetricsBackend};
use tether_model::LeaseState;

/// [`MetricsBackend`] that records into a Prometheus [`Registry`].
///
/// Cheap to clone; clones share the same collectors.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    heartbeats: IntCounterVec,
    consecutive_failures: IntGauge,
    transitions: IntCounterVec,
    registrations: IntCounterVec,
    deregistrations: IntCounterVec,
    hostname_refresh: IntCounterVec,
}

impl PrometheusMetrics {
    /// Backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Backend registering its collectors into an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let heartbeats = IntCounterVec::new(
            Opts::new("tether_heartbeats_total", "Heartbeat attempts by outcome"),
            &["outcome"],
        )?;
        let consecutive_failures = IntGauge::new(
            "tether_consecutive_failures",
            "Failed heartbeats since the last successful renewal",
        )?;
        let transitions = IntCounterVec::new(
            Opts::new(
                "tether_lease_state_transitions_total",
                "Lease state transitions by target state",
            ),
            &["state"],
        )?;
        let registrations = outcome_counter(
            "tether_registrations_total",
            "Registration attempts by outcome",
        )?;
        let deregistrations = outcome_counter(
            "tether_deregistrations_total",
            "Deregistration attempts by outcome",
        )?;
        let hostname_refresh = outcome_counter(
            "tether_hostname_refresh_total",
            "Forced hostname lookups by outcome",
        )?;

        registry.register(Box::new(heartbeats.clone()))?;
        registry.register(Box::new(consecutive_failures.clone()))?;
        registry.register(Box::new(transitions.clone()))?;
        registry.register(Box::new(registrations.clone()))?;
        registry.register(Box::new(deregistrations.clone()))?;
        registry.register(Box::new(hostname_refresh.clone()))?;

        // Export every series from the start so absent-vs-zero is unambiguous.
        for outcome in [
            HeartbeatOutcome::Success,
            HeartbeatOutcome::NotFound,
            HeartbeatOutcome::Transient,
        ] {
            heartbeats.with_label_values(&[outcome.as_label()]);
        }

        Ok(Self {
            registry,
            heartbeats,
            consecutive_failures,
            transitions,
            registrations,
            deregistrations,
            hostname_refresh,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_heartbeat(&self, outcome: HeartbeatOutcome) {
        self.heartbeats.with_label_values(&[outcome.as_label()]).inc();
    }

    fn set_consecutive_failures(&self, count: u32) {
        self.consecutive_failures.set(i64::from(count));
    }

    fn record_state(&self, state: LeaseState) {
        self.transitions.with_label_values(&[state.as_str()]).inc();
    }

    fn record_registration(&self, ok: bool) {
        self.registrations.with_label_values(&[label(ok)]).inc();
    }

    fn record_deregistration(&self, ok: bool) {
        self.deregistrations.with_label_values(&[label(ok)]).inc();
    }

    fn record_hostname_refresh(&self, ok: bool) {
        self.hostname_refresh.with_label_values(&[label(ok)]).inc();
    }
}

fn outcome_counter(name: &str, help: &str) -> Result<IntCounterVec, prometheus::Error> {
    IntCounterVec::new(Opts::new(name, help), &["outcome"])
}

fn label(ok: bool) -> &'static str {
    if ok { "success" } else { "failure" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoder, TextEncoder};

    fn render(metrics: &PrometheusMetrics) -> String {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&metrics.gather(), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn heartbeat_outcomes_are_counted() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_heartbeat(HeartbeatOutcome::Success);
        metrics.record_heartbeat(HeartbeatOutcome::Success);
        metrics.record_heartbeat(HeartbeatOutcome::Transient);

        assert_eq!(metrics.heartbeats.with_label_values(&["success"]).get(), 2);
        assert_eq!(metrics.heartbeats.with_label_values(&["transient"]).get(), 1);
        assert_eq!(metrics.heartbeats.with_label_values(&["not_found"]).get(), 0);
    }

    #[test]
    fn gauge_tracks_latest_failure_count() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.set_consecutive_failures(3);
        metrics.set_consecutive_failures(0);
        assert_eq!(metrics.consecutive_failures.get(), 0);
    }

    #[test]
    fn text_exposition_contains_series() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_state(LeaseState::LeaseLost);
        metrics.record_registration(false);

        let text = render(&metrics);
        assert!(text.contains(r#"tether_lease_state_transitions_total{state="lease_lost"} 1"#));
        assert!(text.contains(r#"tether_registrations_total{outcome="failure"} 1"#));
        assert!(text.contains(r#"tether_heartbeats_total{outcome="success"} 0"#));
    }

    #[test]
    fn double_registration_into_same_registry_fails() {
        let registry = Registry::new();
        PrometheusMetrics::with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::with_registry(registry).is_err());
    }
}
