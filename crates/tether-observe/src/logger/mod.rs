//! Global `tracing` subscriber setup for processes running a lease scheduler.

mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the process-wide subscriber described by `cfg`.
///
/// The filter is validated before anything is installed. Fails with
/// [`LoggerError::AlreadyInitialized`] if a global subscriber is already set.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = log::filter(&cfg.level)?;
    match cfg.format {
        LoggerFormat::Text => log::text(cfg, filter)?,
        LoggerFormat::Json => log::json(cfg, filter)?,
        LoggerFormat::Journald => log::journald(filter)?,
    }
    tracing::debug!(format = %cfg.format, level = %cfg.level, "logger installed");
    Ok(())
}
