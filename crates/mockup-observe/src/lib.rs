//! Logging setup for the mockup service.
//!
//! Build a [`LoggerConfig`] (usually with [`LoggerConfig::from_env`]) and pass it to
//! [`init_logger`] once, before the async runtime starts.
mod clock;
mod config;
mod error;
mod format;
mod install;
mod level;

pub use clock::{LogClock, LoggerTimeZone};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global tracing subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when a subscriber is already set.
/// With [`LoggerTimeZone::Local`] call this before spawning threads: the local
/// offset can only be read reliably while the process is single-threaded.
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
