use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tether_core::{HostnameResolver, MetadataStore, MetricsHandle, StaticHealth};
use tether_discover::{DiscoverConfig, HttpTransport, LeaseScheduler};
use tether_model::{
    InstanceConfig, InstanceDescriptor, InstanceSettings, LeaseEvent, LeaseState,
};
use tether_observe::{LogSubscriber, LoggerConfig, logger_init};
use tether_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let cfg = LoggerConfig {
        level: std::env::var("TETHER_LOG").unwrap_or_else(|_| "info".to_string()),
        ..Default::default()
    };
    logger_init(&cfg)?;
    info!("logger initialized");

    // 2) Instance settings; TETHER_INSTANCE may hold a JSON document.
    let settings = match std::env::var("TETHER_INSTANCE") {
        Ok(doc) => serde_json::from_str::<InstanceSettings>(&doc)
            .context("TETHER_INSTANCE is not valid instance settings")?,
        Err(_) => InstanceSettings::new("demo-agent")
            .with_non_secure_port(8085, true)
            .with_lease(10, 35)
            .with_metadata("demo", "true"),
    };
    let descriptor = InstanceDescriptor::new(settings)?;

    // 3) Discovery transport
    let discover_config = DiscoverConfig::new(
        std::env::var("TETHER_DIRECTORY_URL")
            .unwrap_or_else(|_| "http://localhost:8761/eureka".to_string()),
    );
    let transport = Arc::new(HttpTransport::new(&discover_config)?);
    info!(url = %discover_config.service_url, "discovery configured");

    // 4) Scheduler
    let metrics = PrometheusMetrics::new()?;
    let metrics_handle: MetricsHandle = Arc::new(metrics.clone());
    let health = Arc::new(StaticHealth::new(false));
    let metadata = MetadataStore::with_entries(descriptor.initial_metadata());

    let lost = Arc::new(tokio::sync::Notify::new());
    let lost_signal = Arc::clone(&lost);
    let scheduler = LeaseScheduler::builder(descriptor, transport)
        .config(discover_config)
        .metadata(metadata.clone())
        .resolver(Arc::new(HostnameResolver::system()))
        .health_check(health.clone())
        .metrics(metrics_handle)
        .subscriber(Arc::new(LogSubscriber))
        .subscriber(Arc::new(move |event: &LeaseEvent| {
            if matches!(event, LeaseEvent::LeaseLost { .. }) {
                lost_signal.notify_one();
            }
        }))
        .build()?;

    if let Err(e) = scheduler.register().await {
        warn!("initial registration failed, heartbeats will retry: {e}");
    }
    scheduler.start()?;
    health.set(true);
    metadata.set("ready-at", format!("{:?}", std::time::SystemTime::now()));

    // 5) Keep running; re-register on lease loss until Ctrl+C.
    info!("press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = lost.notified() => {
                if scheduler.state() != LeaseState::LeaseLost {
                    continue;
                }
                match scheduler.register().await {
                    Ok(()) => scheduler.start()?,
                    Err(e) => {
                        warn!("re-registration failed: {e}");
                        tokio::time::sleep(scheduler.descriptor().lease_renewal_interval()).await;
                        lost.notify_one();
                    }
                }
            }
        }
    }

    info!("shutting down...");
    scheduler.stop().await;

    let mut buf = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
    info!("final metrics:\n{}", String::from_utf8_lossy(&buf));
    Ok(())
}
