//! Configuration for the callback runner.

use std::time::Duration;

use crate::error::ConfigError;

/// Main configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            runner: RunnerConfig::from_env()?,
        })
    }
}

/// Callback runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Upper bound on a single callback invocation. Callbacks that declare
    /// their own timeout override this. `None` waits indefinitely.
    pub hook_timeout: Option<Duration>,
    /// Log at `warn` instead of `debug` when a legacy `beforeUpdate`
    /// callback is called without the criteria the caller supplied.
    pub warn_on_dropped_criteria: bool,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms: u64 = parse_optional_env("LIFECYCLE_HOOK_TIMEOUT_MS", 0)?;
        Ok(Self {
            hook_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            warn_on_dropped_criteria: parse_bool_env("LIFECYCLE_WARN_DROPPED_CRITERIA", false)?,
        })
    }
}

// Helper functions

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

pub(crate) fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional_env(key)? {
        Some(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("must be 'true' or 'false', got '{s}'"),
            }),
        },
        None => Ok(default),
    }
}
