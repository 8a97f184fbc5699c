//! Error types for configuration operations.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field (or environment variable) that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.to_string()),
            reason,
        }
    }

    /// Human-readable description including the offending field.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::InvalidField {
                field,
                value: Some(value),
                reason,
            } => format!("invalid value '{value}' for {field}: {reason}"),
            Self::InvalidField {
                field,
                value: None,
                reason,
            } => format!("invalid {field}: {reason}"),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
