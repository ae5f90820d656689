use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{
    clock::LoggerTimeZone,
    error::{LoggerError, LoggerResult},
    format::LoggerFormat,
    level::LoggerLevel,
};

pub const ENV_FORMAT: &str = "MOCKUP_LOG_FORMAT";
pub const ENV_LEVEL: &str = "MOCKUP_LOG_LEVEL";
pub const ENV_TZ: &str = "MOCKUP_LOG_TZ";
pub const ENV_COLOR: &str = "MOCKUP_LOG_COLOR";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `"mockup_core=debug,info"`.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include the event target (module path) in each line.
    pub with_targets: bool,
    /// Color text output; ignored unless stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Read `MOCKUP_LOG_FORMAT`, `MOCKUP_LOG_LEVEL` (or `RUST_LOG`), `MOCKUP_LOG_TZ`
    /// and `MOCKUP_LOG_COLOR`. Unset or blank variables keep their defaults.
    pub fn from_env() -> LoggerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoggerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get(ENV_FORMAT) {
            cfg.format = v.parse()?;
        }
        if let Some(v) = get(ENV_LEVEL).or_else(|| get("RUST_LOG")) {
            cfg.level = v.parse()?;
        }
        if let Some(v) = get(ENV_TZ) {
            cfg.tz = v.parse()?;
        }
        if let Some(v) = get(ENV_COLOR) {
            cfg.use_color = parse_flag(ENV_COLOR, &v)?;
        }
        Ok(cfg)
    }

    /// Color only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

fn parse_flag(var: &'static str, value: &str) -> LoggerResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LoggerError::InvalidVar {
            var,
            value: value.to_string(),
        }),
    }
}
