//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers; parsing lives in `validate.rs`, environment access in `loader.rs`.
//! - Values held here are already validated, so consumers never re-check them.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::{DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS};
use crate::error::ConfigResult;
use crate::validate::{parse_base_url, parse_refresh_path, validate_timeout};

/// Whether a 401 should first try to renew the bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum RefreshPolicy {
    /// A 401 ends the session immediately.
    #[default]
    Disabled,
    /// POST to `path` with the current token to obtain a replacement.
    Endpoint {
        /// Path relative to the API origin, starting with `/`.
        path: String,
    },
}

impl RefreshPolicy {
    /// Refresh endpoint path, when enabled.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Disabled => None,
            Self::Endpoint { path } => Some(path),
        }
    }
}

/// Settings for the HTTP client and its persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin every request path is resolved against.
    pub base_url: Url,
    /// Fixed per-request timeout.
    pub timeout: Duration,
    /// Token refresh behaviour on 401.
    pub refresh: RefreshPolicy,
    /// Directory for the persisted session; `None` selects the home default.
    pub state_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Build a configuration from raw values, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] when the URL or timeout is unusable.
    pub fn new(base_url: &str, timeout: Duration) -> ConfigResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: validate_timeout(timeout)?,
            refresh: RefreshPolicy::Disabled,
            state_dir: None,
        })
    }

    /// Replace the refresh policy.
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Replace the state directory.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Re-check a configuration assembled field by field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] for the first unusable field.
    pub fn validate(&self) -> ConfigResult<()> {
        parse_base_url(self.base_url.as_str())?;
        validate_timeout(self.timeout)?;
        if let Some(path) = self.refresh.path() {
            parse_refresh_path(path)?;
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL)
                .unwrap_or_else(|err| unreachable!("built-in API URL must parse: {err}")),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            refresh: RefreshPolicy::Disabled,
            state_dir: None,
        }
    }
}

/// Logging preferences read alongside the client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    /// Log level directive (e.g., `info`, `socialpet_client=debug`).
    pub level: String,
    /// Requested output format (`json` or `pretty`); `None` lets the build decide.
    pub format: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;

    #[test]
    fn default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.refresh, RefreshPolicy::Disabled);
        assert!(config.state_dir.is_none());
    }

    #[test]
    fn validate_catches_fields_set_directly() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_ok());
        config.timeout = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField { field: "timeout_ms", .. })
        ));
        config.timeout = Duration::from_secs(1);
        config.refresh = RefreshPolicy::Endpoint {
            path: "auth/refresh-token".into(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField { field: "refresh_path", .. })
        ));
    }

    #[test]
    fn new_validates_inputs() {
        assert!(ClientConfig::new("https://api.example.com", Duration::from_secs(5)).is_ok());
        assert!(matches!(
            ClientConfig::new("not a url", Duration::from_secs(5)),
            Err(ConfigError::InvalidField { field: "api_url", .. })
        ));
        assert!(matches!(
            ClientConfig::new("https://api.example.com", Duration::ZERO),
            Err(ConfigError::InvalidField { field: "timeout_ms", .. })
        ));
    }

    #[test]
    fn refresh_policy_serializes_with_mode_tag() -> Result<(), serde_json::Error> {
        let policy = RefreshPolicy::Endpoint {
            path: "/auth/refresh-token".into(),
        };
        let value = serde_json::to_value(&policy)?;
        assert_eq!(value["mode"], "endpoint");
        assert_eq!(policy.path(), Some("/auth/refresh-token"));
        assert_eq!(RefreshPolicy::Disabled.path(), None);
        Ok(())
    }
}
