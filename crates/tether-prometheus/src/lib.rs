//! Prometheus metrics backend for tether lease clients.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`tether_core::MetricsBackend`]
//! that exposes lease client metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tether_core::MetricsHandle;
//! use tether_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//!
//! // Pass `handle` to `LeaseSchedulerBuilder::metrics`, then serve:
//! let families = metrics.gather();
//! # assert!(!families.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `tether_heartbeats_total{outcome}` - Counter
//! - `tether_consecutive_failures` - Gauge
//! - `tether_lease_state_transitions_total{state}` - Counter
//! - `tether_registrations_total{outcome}` - Counter
//! - `tether_deregistrations_total{outcome}` - Counter
//! - `tether_hostname_refresh_total{outcome}` - Counter
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for the `/metrics` endpoint.
//! Encode [`PrometheusMetrics::gather`] with [`TextEncoder`] in your own handler.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
