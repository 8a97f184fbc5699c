//! Validation helpers and parsing utilities for client configuration.

use std::time::Duration;

use url::Url;

use crate::defaults::MAX_TIMEOUT_MS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::RefreshPolicy;

/// Parse the API origin. Only absolute `http`/`https` URLs without query or
/// fragment are accepted, since request paths are appended verbatim.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for malformed or unsupported URLs.
pub fn parse_base_url(input: &str) -> ConfigResult<Url> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed)
        .map_err(|_| ConfigError::invalid("api_url", trimmed, "must be an absolute URL"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "api_url",
            trimmed,
            "scheme must be http or https",
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid("api_url", trimmed, "host is required"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::invalid(
            "api_url",
            trimmed,
            "query and fragment are not allowed",
        ));
    }
    Ok(url)
}

/// Parse a timeout expressed in milliseconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or out-of-range values.
pub fn parse_timeout_ms(input: &str) -> ConfigResult<Duration> {
    let trimmed = input.trim();
    let millis = trimmed
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid("timeout_ms", trimmed, "must be an integer"))?;
    validate_timeout(Duration::from_millis(millis))
        .map_err(|_| ConfigError::invalid("timeout_ms", trimmed, "must be between 1 and 300000"))
}

/// Ensure a timeout is positive and bounded.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the timeout is zero or too long.
pub fn validate_timeout(timeout: Duration) -> ConfigResult<Duration> {
    if timeout.is_zero() {
        return Err(ConfigError::InvalidField {
            field: "timeout_ms",
            value: Some("0".to_string()),
            reason: "must be positive",
        });
    }
    if timeout > Duration::from_millis(MAX_TIMEOUT_MS) {
        return Err(ConfigError::InvalidField {
            field: "timeout_ms",
            value: Some(timeout.as_millis().to_string()),
            reason: "must not exceed five minutes",
        });
    }
    Ok(timeout)
}

/// Parse the refresh endpoint setting. Blank input disables refresh.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the path is absolute or not rooted.
pub fn parse_refresh_path(input: &str) -> ConfigResult<RefreshPolicy> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(RefreshPolicy::Disabled);
    }
    if trimmed.contains("://") {
        return Err(ConfigError::invalid(
            "refresh_path",
            trimmed,
            "must be relative to the API origin",
        ));
    }
    if !trimmed.starts_with('/') {
        return Err(ConfigError::invalid(
            "refresh_path",
            trimmed,
            "must start with '/'",
        ));
    }
    Ok(RefreshPolicy::Endpoint {
        path: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_origins_with_prefix() -> ConfigResult<()> {
        let url = parse_base_url(" http://localhost:8080 ")?;
        assert_eq!(url.port(), Some(8080));
        let prefixed = parse_base_url("https://api.example.com/mobile/")?;
        assert_eq!(prefixed.path(), "/mobile/");
        Ok(())
    }

    #[test]
    fn base_url_rejects_unsupported_shapes() {
        for input in [
            "",
            "localhost:8080",
            "ftp://files.example.com",
            "http://api.example.com/?debug=1",
            "http://api.example.com/#top",
        ] {
            assert!(parse_base_url(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn timeout_bounds_are_enforced() -> ConfigResult<()> {
        assert_eq!(parse_timeout_ms("2500")?, Duration::from_millis(2500));
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("-5").is_err());
        assert!(parse_timeout_ms("300001").is_err());
        assert!(parse_timeout_ms("soon").is_err());
        Ok(())
    }

    #[test]
    fn refresh_path_parsing() -> ConfigResult<()> {
        assert_eq!(parse_refresh_path("  ")?, RefreshPolicy::Disabled);
        assert_eq!(
            parse_refresh_path("/auth/refresh-token")?,
            RefreshPolicy::Endpoint {
                path: "/auth/refresh-token".into()
            }
        );
        assert!(parse_refresh_path("auth/refresh").is_err());
        assert!(parse_refresh_path("http://evil.example.com/refresh").is_err());
        Ok(())
    }
}
