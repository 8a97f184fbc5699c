//! Description of a single outbound call and URL resolution.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;

/// HTTP methods used by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }

    /// Parse a method name, case-insensitively.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Optional parts of a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, appended in order.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Extra headers. `Authorization` is always owned by the client.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a raw JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `payload` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the payload cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_value(payload)
            .map_err(|err| ApiError::invalid(format!("request body: {err}")))?;
        Ok(self.body(body))
    }
}

/// Join `path` onto the configured base URL.
///
/// Paths are always relative to the backend; absolute URLs are rejected so a
/// bearer token can never be sent to another host.
pub(crate) fn resolve_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    let path = path.trim();
    if path.contains("://") || path.starts_with("//") {
        return Err(ApiError::invalid(format!(
            "path must be relative to the API base URL: {path}"
        )));
    }
    if path.contains(['?', '#']) {
        return Err(ApiError::invalid(
            "query parameters belong in RequestOptions::query",
        ));
    }
    let base = base.as_str().trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };
    Url::parse(&joined).map_err(|err| ApiError::invalid(format!("invalid request url: {err}")))
}
