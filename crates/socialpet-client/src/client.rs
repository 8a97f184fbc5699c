//! Transport and the fixed request pipeline.
//!
//! # Design
//! - Stages run in a fixed order for every call: build, attach credential,
//!   dispatch, classify, then expiry (optionally preceded by refresh) on 401.
//!   They are plain code, so reconfiguring the client cannot stack them.
//! - `configure` swaps the whole transport behind an `Arc`; calls already in
//!   flight finish on the transport they started with.
//! - The credential is snapshotted once per attempt together with its
//!   generation, which is what the expiry guard compares against.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use socialpet_config::validate::{parse_base_url, validate_timeout};
use socialpet_config::{ClientConfig, RefreshPolicy};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ClientSetupError, classify_response};
use crate::navigation::NavigationGate;
use crate::refresh::{RefreshCoordinator, RenewOutcome};
use crate::request::{Method, RequestOptions, resolve_url};
use crate::session::{Credential, Session, SessionResult, UserProfile};

/// Header carrying the per-request correlation id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

#[derive(Debug)]
struct Transport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    refresh: RefreshPolicy,
}

impl Transport {
    fn build(
        base_url: Url,
        timeout: Duration,
        refresh: RefreshPolicy,
    ) -> Result<Self, ClientSetupError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("socialpet-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientSetupError::HttpClient { source })?;
        Ok(Self {
            http,
            base_url,
            timeout,
            refresh,
        })
    }
}

/// Outcome of a single attempt that did not succeed.
enum Failure {
    /// 401 for a request sent with `credential`.
    Unauthorized {
        credential: Credential,
        error: ApiError,
    },
    Other(ApiError),
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self::Other(error)
    }
}

impl Failure {
    fn into_error(self) -> ApiError {
        match self {
            Self::Unauthorized { error, .. } | Self::Other(error) => error,
        }
    }
}

#[derive(Debug)]
struct ClientInner {
    transport: RwLock<Arc<Transport>>,
    session: Arc<Session>,
    navigation: NavigationGate,
    refresh: RefreshCoordinator,
}

/// Session-aware client for the SocialPet backend. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Build a client for `config` backed by `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetupError::HttpClient`] when the HTTP stack cannot be
    /// initialised.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ClientSetupError> {
        let transport = Transport::build(
            config.base_url.clone(),
            config.timeout,
            config.refresh.clone(),
        )?;
        debug!(
            base_url = %transport.base_url,
            timeout_ms = millis(transport.timeout),
            refresh = transport.refresh.path().is_some(),
            "api client created"
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport: RwLock::new(Arc::new(transport)),
                session,
                navigation: NavigationGate::new(),
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    /// Point the client at another backend. The last call wins; the refresh
    /// policy is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetupError::Config`] for an unusable URL or timeout and
    /// leaves the current transport in place.
    pub fn configure(&self, base_url: &str, timeout: Duration) -> Result<(), ClientSetupError> {
        let base_url = parse_base_url(base_url)?;
        let timeout = validate_timeout(timeout)?;
        let refresh = self.transport().refresh.clone();
        self.install(Transport::build(base_url, timeout, refresh)?);
        Ok(())
    }

    /// Replace base URL, timeout, and refresh policy from a full config.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetupError::HttpClient`] when the HTTP stack cannot be
    /// rebuilt.
    pub fn apply_config(&self, config: &ClientConfig) -> Result<(), ClientSetupError> {
        self.install(Transport::build(
            config.base_url.clone(),
            validate_timeout(config.timeout)?,
            config.refresh.clone(),
        )?);
        Ok(())
    }

    fn install(&self, transport: Transport) {
        info!(
            base_url = %transport.base_url,
            timeout_ms = millis(transport.timeout),
            "api client reconfigured"
        );
        *self
            .inner
            .transport
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(transport);
    }

    fn transport(&self) -> Arc<Transport> {
        self.inner
            .transport
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Base URL requests are currently sent to.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.transport().base_url.clone()
    }

    /// Timeout applied to each request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.transport().timeout
    }

    /// Session shared with this client.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// Gate the UI attaches its login navigator to.
    #[must_use]
    pub fn navigation(&self) -> &NavigationGate {
        &self.inner.navigation
    }

    /// Store a bearer token for subsequent requests and drop any login
    /// redirect still queued from an earlier expiry.
    ///
    /// # Errors
    ///
    /// See [`Session::attach_token`].
    pub fn attach_token(&self, token: impl Into<String>) -> SessionResult<()> {
        self.inner.session.attach_token(token)?;
        self.inner.navigation.cancel_pending();
        Ok(())
    }

    /// Store a token together with the signed-in account (login flow).
    ///
    /// A login redirect still queued from an earlier expiry is dropped, so a
    /// navigator attached afterwards does not leave the fresh session.
    ///
    /// # Errors
    ///
    /// See [`Session::establish`].
    pub fn establish(&self, token: impl Into<String>, user: UserProfile) -> SessionResult<()> {
        self.inner.session.establish(token, user)?;
        self.inner.navigation.cancel_pending();
        Ok(())
    }

    /// Forget the bearer token (explicit logout).
    ///
    /// # Errors
    ///
    /// See [`Session::clear_token`].
    pub fn clear_token(&self) -> SessionResult<()> {
        self.inner.session.clear_token()
    }

    /// Send a request and return the decoded JSON body (`Value::Null` for
    /// empty bodies).
    ///
    /// # Errors
    ///
    /// Every failure is classified into an [`ApiError`]. A 401 for the
    /// current token also ends the session and requests login navigation,
    /// once per expiry episode.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let transport = self.transport();
        let credential = self.inner.session.credential();
        match self
            .send_once(&transport, method, path, &options, &credential)
            .await
        {
            Ok(body) => Ok(body),
            Err(Failure::Other(error)) => Err(error),
            Err(Failure::Unauthorized { credential, error }) => {
                self.recover_unauthorized(&transport, method, path, &options, credential, error)
                    .await
            }
        }
    }

    /// `GET` and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; a body that does not match `T` yields
    /// [`ApiError::MalformedResponse`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_json_with(path, RequestOptions::new()).await
    }

    /// `GET` with query parameters or headers and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(Method::Get, path, options).await?)
    }

    /// `POST` a JSON payload and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::new().json(payload)?;
        decode(self.request(Method::Post, path, options).await?)
    }

    /// `PUT` a JSON payload and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn put_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::new().json(payload)?;
        decode(self.request(Method::Put, path, options).await?)
    }

    /// `DELETE`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<(), ApiError> {
        self.request(Method::Delete, path, options).await.map(drop)
    }

    async fn recover_unauthorized(
        &self,
        transport: &Transport,
        method: Method,
        path: &str,
        options: &RequestOptions,
        credential: Credential,
        error: ApiError,
    ) -> Result<Value, ApiError> {
        if credential.token.is_none() {
            debug!(path, "401 on an anonymous request");
            return Err(error.into_credentials_rejected());
        }
        let Some(refresh_path) = transport.refresh.path() else {
            self.expire(credential.generation);
            return Err(error);
        };

        let outcome = self
            .inner
            .refresh
            .renew(
                &self.inner.session,
                &credential,
                || self.send_refresh(transport, refresh_path, &credential),
                || self.expire(credential.generation),
            )
            .await;

        match outcome {
            RenewOutcome::Retry => {
                let retry = self.inner.session.credential();
                match self.send_once(transport, method, path, options, &retry).await {
                    Ok(body) => Ok(body),
                    Err(Failure::Unauthorized { credential, error }) => {
                        if credential.token.is_none() {
                            return Err(error.into_credentials_rejected());
                        }
                        self.expire(credential.generation);
                        Err(error)
                    }
                    Err(Failure::Other(error)) => Err(error),
                }
            }
            RenewOutcome::Ended => Err(error),
            RenewOutcome::Unavailable(network) => Err(network),
        }
    }

    async fn send_refresh(
        &self,
        transport: &Transport,
        path: &str,
        credential: &Credential,
    ) -> Result<Value, ApiError> {
        self.send_once(
            transport,
            Method::Post,
            path,
            &RequestOptions::new(),
            credential,
        )
        .await
        .map_err(Failure::into_error)
    }

    /// End the session for a 401 observed at `generation`. Only the first
    /// caller of an episode redirects.
    fn expire(&self, generation: u64) {
        let Some(ticket) = self.inner.session.begin_expiry(generation) else {
            return;
        };
        info!(generation, "session expired; redirecting to login");
        let outcome = self.inner.navigation.request_login();
        debug!(?outcome, "login navigation requested");
        self.inner.session.finish_expiry(ticket);
    }

    async fn send_once(
        &self,
        transport: &Transport,
        method: Method,
        path: &str,
        options: &RequestOptions,
        credential: &Credential,
    ) -> Result<Value, Failure> {
        let url = resolve_url(&transport.base_url, path)?;
        let request_id = Uuid::new_v4().to_string();
        let headers = build_headers(options, credential, &request_id)?;

        let mut builder = transport
            .http
            .request(method.as_reqwest(), url)
            .headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        debug!(
            %method,
            path,
            %request_id,
            authenticated = credential.token.is_some(),
            "sending request"
        );
        let started = Instant::now();
        let response = builder.send().await.map_err(|err| {
            let error = ApiError::from_transport(&err);
            warn!(
                %method,
                path,
                %request_id,
                error = %err,
                "request failed before a response"
            );
            error
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            warn!(
                %method,
                path,
                %request_id,
                error = %err,
                "failed to read response body"
            );
            ApiError::from_transport(&err)
        })?;
        let elapsed_ms = millis(started.elapsed());

        if status.is_success() {
            debug!(
                %method,
                path,
                %request_id,
                status = status.as_u16(),
                elapsed_ms,
                "response received"
            );
            return parse_body(status.as_u16(), &bytes).map_err(Failure::from);
        }

        let error = classify_response(status, &bytes);
        if status.is_server_error() {
            warn!(
                %method,
                path,
                %request_id,
                status = status.as_u16(),
                elapsed_ms,
                "server error"
            );
        } else {
            debug!(
                %method,
                path,
                %request_id,
                status = status.as_u16(),
                elapsed_ms,
                "request rejected"
            );
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Failure::Unauthorized {
                credential: credential.clone(),
                error,
            });
        }
        Err(Failure::Other(error))
    }
}

fn build_headers(
    options: &RequestOptions,
    credential: &Credential,
    request_id: &str,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::invalid(format!("invalid header name: {name}")))?;
        if name == AUTHORIZATION {
            debug!("dropping caller-supplied authorization header");
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|_| ApiError::invalid(format!("invalid value for header {name}")))?;
        headers.insert(name, value);
    }
    headers.insert(
        HeaderName::from_static(HEADER_REQUEST_ID),
        HeaderValue::from_str(request_id)
            .map_err(|_| ApiError::invalid("invalid request id"))?,
    );
    if let Some(token) = &credential.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::invalid("stored token is not a valid header value"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_body(status: u16, bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|err| ApiError::malformed(Some(status), err.to_string()))
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|err| ApiError::malformed(None, err.to_string()))
}
