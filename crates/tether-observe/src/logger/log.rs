use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError};

/// Default directive appended so heartbeat chatter stays quiet unless asked for.
const QUIET_HEARTBEATS: &str = "tether_discover::tasks::heartbeat=info";

/// Human-readable lines, colored when the config asks for it.
pub(crate) fn text(cfg: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let layer = fmt::layer()
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_timer(local_timer());
    install(tracing_subscriber::registry().with(filter).with(layer))
}

/// One JSON object per event, with the current span attached.
pub(crate) fn json(cfg: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_current_span(true)
        .with_target(cfg.with_targets)
        .with_timer(local_timer());
    install(tracing_subscriber::registry().with(filter).with(layer))
}

/// Build the filter; bare levels get the heartbeat directive unless they target it already.
pub(crate) fn filter(level: &str) -> Result<EnvFilter, LoggerError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(LoggerError::InvalidLogLevel(level.to_string()));
    }
    let directives = if level.contains("tether_discover") || level.contains(',') {
        level.to_string()
    } else {
        format!("{level},{QUIET_HEARTBEATS}")
    };
    EnvFilter::try_new(&directives).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn install<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber.try_init().map_err(|e| {
        let msg = e.to_string();
        if msg.contains("SetGlobalDefaultError") {
            LoggerError::AlreadyInitialized
        } else {
            LoggerError::InitializationFailed(msg)
        }
    })
}

#[cfg(all(target_os = "linux", feature = "journald"))]
pub(crate) fn journald(filter: EnvFilter) -> Result<(), LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?
        .with_syslog_identifier("tether".to_string());
    install(tracing_subscriber::registry().with(filter).with(layer))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
pub(crate) fn journald(_filter: EnvFilter) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_gets_heartbeat_directive() {
        let f = filter("debug").unwrap();
        assert!(f.to_string().contains("tether_discover::tasks::heartbeat=info"));
    }

    #[test]
    fn explicit_directives_are_kept() {
        let f = filter("tether_discover=trace").unwrap();
        assert_eq!(f.to_string(), "tether_discover=trace");
    }

    #[test]
    fn garbage_level_is_rejected() {
        assert!(matches!(filter("tether=verbose"), Err(LoggerError::InvalidLogLevel(_))));
        assert!(matches!(filter("  "), Err(LoggerError::InvalidLogLevel(_))));
    }
}
