//! Error taxonomy for API calls and the classification boundary.
//!
//! # Design
//! - Every failure becomes one closed `ApiError` variant here; callers match on
//!   kinds instead of probing response payloads.
//! - Messages on the enum stay constant; context lives in fields.
//! - `user_message` is the only place user-facing wording is decided.

use reqwest::StatusCode;
use socialpet_api_models::ServerMessage;
use socialpet_config::ConfigError;
use thiserror::Error;

/// Why the server could not be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkFailure {
    /// The per-request timeout elapsed.
    Timeout,
    /// Connection could not be established (DNS, refused, offline).
    Connect,
    /// Any other transport-level failure.
    Other,
}

/// Coarse classification used by screens to pick a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request never reached the server or the response never arrived.
    NetworkUnavailable,
    /// HTTP 401.
    AuthenticationExpired,
    /// HTTP 403.
    AuthorizationDenied,
    /// HTTP 404.
    NotFound,
    /// Any other 4xx.
    ClientValidation,
    /// HTTP 5xx.
    ServerError,
    /// Body could not be decoded as expected.
    MalformedResponse,
    /// Request was rejected locally and never sent.
    InvalidRequest,
}

/// Failure of a single API call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached.
    #[error("network unavailable")]
    NetworkUnavailable {
        /// Transport failure category.
        failure: NetworkFailure,
        /// Transport error text, for logs.
        detail: String,
    },
    /// The bearer credential was rejected (HTTP 401).
    #[error("authentication expired")]
    AuthenticationExpired {
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// The account may not perform the operation (HTTP 403).
    #[error("authorization denied")]
    AuthorizationDenied {
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// The resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound {
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// Any other 4xx response.
    #[error("request rejected by server")]
    ClientValidation {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// A 5xx response.
    #[error("server error")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// The response body did not have the expected shape.
    #[error("malformed response")]
    MalformedResponse {
        /// HTTP status code, when the failure is tied to one.
        status: Option<u16>,
        /// Decode error text, for logs.
        detail: String,
    },
    /// The request could not be built and was never dispatched.
    #[error("invalid request")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },
}

impl ApiError {
    /// Coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkUnavailable { .. } => ErrorKind::NetworkUnavailable,
            Self::AuthenticationExpired { .. } => ErrorKind::AuthenticationExpired,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ClientValidation { .. } => ErrorKind::ClientValidation,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status that produced this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationExpired { .. } => Some(401),
            Self::AuthorizationDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ClientValidation { status, .. } | Self::ServerError { status, .. } => {
                Some(*status)
            }
            Self::MalformedResponse { status, .. } => *status,
            Self::NetworkUnavailable { .. } | Self::InvalidRequest { .. } => None,
        }
    }

    /// Message supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::AuthenticationExpired { message }
            | Self::AuthorizationDenied { message }
            | Self::NotFound { message }
            | Self::ClientValidation { message, .. }
            | Self::ServerError { message, .. } => message.as_deref(),
            Self::NetworkUnavailable { .. }
            | Self::MalformedResponse { .. }
            | Self::InvalidRequest { .. } => None,
        }
    }

    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable {
                failure: NetworkFailure::Timeout,
                ..
            } => "The server did not respond in time. Check your connection and try again."
                .to_string(),
            Self::NetworkUnavailable { .. } => {
                "Could not reach the server. Check your internet connection.".to_string()
            }
            Self::AuthenticationExpired { .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::AuthorizationDenied { message } => message
                .clone()
                .unwrap_or_else(|| "You do not have permission to do that.".to_string()),
            Self::NotFound { message } => message
                .clone()
                .unwrap_or_else(|| "The requested item could not be found.".to_string()),
            Self::ClientValidation {
                status: 401,
                message,
            } => message.clone().unwrap_or_else(|| {
                "Login failed. Check your credentials and try again.".to_string()
            }),
            Self::ClientValidation { message, .. } => message
                .clone()
                .unwrap_or_else(|| "The request could not be processed.".to_string()),
            Self::ServerError { .. } | Self::MalformedResponse { .. } => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
            Self::InvalidRequest { .. } => "The request could not be sent.".to_string(),
        }
    }

    /// Whether a screen should render its own message for this error. An
    /// expired session is answered by the login redirect instead.
    #[must_use]
    pub const fn should_display(&self) -> bool {
        !matches!(self, Self::AuthenticationExpired { .. })
    }

    /// Whether the caller may reasonably offer a retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable { .. } | Self::ServerError { .. }
        )
    }

    /// Re-classify a 401 for a request that carried no token. Nothing
    /// expired, so the server's rejection is shown like any other 4xx.
    pub(crate) fn into_credentials_rejected(self) -> Self {
        match self {
            Self::AuthenticationExpired { message } => Self::ClientValidation {
                status: 401,
                message,
            },
            other => other,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            status,
            detail: detail.into(),
        }
    }

    /// Classify a transport-level failure.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        let failure = if err.is_timeout() {
            NetworkFailure::Timeout
        } else if err.is_connect() {
            NetworkFailure::Connect
        } else if err.is_builder() {
            return Self::invalid(err.to_string());
        } else if err.is_decode() {
            return Self::malformed(err.status().map(|status| status.as_u16()), err.to_string());
        } else {
            NetworkFailure::Other
        };
        Self::NetworkUnavailable {
            failure,
            detail: err.to_string(),
        }
    }
}

/// Classify a non-2xx response.
#[must_use]
pub fn classify_response(status: StatusCode, body: &[u8]) -> ApiError {
    let message = server_message(body);
    match status.as_u16() {
        401 => ApiError::AuthenticationExpired { message },
        403 => ApiError::AuthorizationDenied { message },
        404 => ApiError::NotFound { message },
        code @ 400..=499 => ApiError::ClientValidation {
            status: code,
            message,
        },
        code @ 500..=599 => ApiError::ServerError {
            status: code,
            message,
        },
        code => ApiError::malformed(Some(code), format!("unexpected status {status}")),
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ServerMessage>(body)
        .ok()
        .and_then(|payload| payload.best_message().map(str::to_string))
}

/// Errors raised while building or reconfiguring the transport.
#[derive(Debug, Error)]
pub enum ClientSetupError {
    /// A configuration value was rejected.
    #[error("invalid client configuration")]
    Config {
        /// Source configuration error.
        #[from]
        source: ConfigError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Source reqwest error.
        source: reqwest::Error,
    },
}
