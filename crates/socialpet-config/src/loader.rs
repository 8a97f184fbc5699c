//! Environment loading for client and telemetry settings.
//!
//! # Design
//! - All lookups go through a caller-supplied function so tests never mutate
//!   the process environment.
//! - Unset or blank variables keep the built-in defaults; set-but-invalid
//!   variables are errors rather than silently ignored.

use std::path::PathBuf;

use crate::error::ConfigResult;
use crate::model::{ClientConfig, TelemetrySettings};
use crate::validate::{parse_base_url, parse_refresh_path, parse_timeout_ms};

/// API origin.
pub const ENV_API_URL: &str = "SOCIALPET_API_URL";
/// Per-request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SOCIALPET_HTTP_TIMEOUT_MS";
/// Token refresh endpoint path; unset disables refresh.
pub const ENV_REFRESH_PATH: &str = "SOCIALPET_REFRESH_PATH";
/// Directory holding the persisted session.
pub const ENV_STATE_DIR: &str = "SOCIALPET_STATE_DIR";
/// Log level directive.
pub const ENV_LOG_LEVEL: &str = "SOCIALPET_LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "SOCIALPET_LOG_FORMAT";

impl ClientConfig {
    /// Load client settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load client settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError`] when a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = non_blank(&lookup, ENV_API_URL) {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Some(raw) = non_blank(&lookup, ENV_TIMEOUT_MS) {
            config.timeout = parse_timeout_ms(&raw)?;
        }
        if let Some(raw) = non_blank(&lookup, ENV_REFRESH_PATH) {
            config.refresh = parse_refresh_path(&raw)?;
        }
        if let Some(raw) = non_blank(&lookup, ENV_STATE_DIR) {
            config.state_dir = Some(PathBuf::from(raw));
        }
        tracing::debug!(
            api_url = %config.base_url,
            timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
            refresh = config.refresh.path().unwrap_or("disabled"),
            "client configuration loaded"
        );
        Ok(config)
    }
}

impl TelemetrySettings {
    /// Load logging preferences from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load logging preferences through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(level) = non_blank(&lookup, ENV_LOG_LEVEL) {
            settings.level = level;
        }
        settings.format = non_blank(&lookup, ENV_LOG_FORMAT).map(|value| value.to_ascii_lowercase());
        settings
    }
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
