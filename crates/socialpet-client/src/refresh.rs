//! Single-flight token renewal after a 401.
//!
//! Requests that hit 401 with the same token queue on one async mutex. The
//! first one through calls the refresh endpoint; the rest find the session
//! generation already advanced and retry with the new token without another
//! refresh call.

use std::future::Future;

use serde_json::Value;
use socialpet_api_models::RefreshTokenResponse;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ErrorKind};
use crate::session::{Credential, Session, SessionState};

/// What a request should do after renewal was attempted.
#[derive(Debug)]
pub(crate) enum RenewOutcome {
    /// A fresh token is in the session; retry once.
    Retry,
    /// The session ended (here or elsewhere); surface the original 401.
    Ended,
    /// The refresh endpoint could not be reached; the session is untouched.
    Unavailable(ApiError),
}

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Renew the token that `stale` was sent with.
    ///
    /// `call` performs the refresh request. `expire` ends the session and
    /// runs while the gate is still held, so queued requests observe the
    /// ended session instead of refreshing again.
    pub(crate) async fn renew<C, Fut, E>(
        &self,
        session: &Session,
        stale: &Credential,
        call: C,
        expire: E,
    ) -> RenewOutcome
    where
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>>,
        E: FnOnce(),
    {
        let _guard = self.gate.lock().await;

        if session.credential().generation != stale.generation {
            return settled(session);
        }

        match call().await {
            Ok(body) => match extract_token(body) {
                Some(token) if session.rotate(stale.generation, &token) => {
                    info!("session token refreshed");
                    RenewOutcome::Retry
                }
                Some(_) => settled(session),
                None => {
                    warn!("refresh response did not carry a token");
                    expire();
                    RenewOutcome::Ended
                }
            },
            Err(err) if err.kind() == ErrorKind::NetworkUnavailable => {
                warn!(error = %err, "token refresh could not reach the server");
                RenewOutcome::Unavailable(err)
            }
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "token refresh rejected");
                expire();
                RenewOutcome::Ended
            }
        }
    }
}

fn settled(session: &Session) -> RenewOutcome {
    if session.state() == SessionState::Authenticated {
        debug!("token already renewed by a concurrent request");
        RenewOutcome::Retry
    } else {
        RenewOutcome::Ended
    }
}

fn extract_token(body: Value) -> Option<String> {
    serde_json::from_value::<RefreshTokenResponse>(body)
        .ok()
        .map(|response| response.token)
        .filter(|token| !token.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use anyhow::Result;
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::Arc;

    fn authenticated() -> Result<Session> {
        let session = Session::restore(Arc::new(MemoryStore::new()));
        session.attach_token("tok-A")?;
        Ok(session)
    }

    #[tokio::test]
    async fn rotates_token_from_either_field() -> Result<()> {
        for body in [json!({ "token": "tok-B" }), json!({ "accessToken": "tok-B" })] {
            let session = authenticated()?;
            let stale = session.credential();
            let expired = Cell::new(false);
            let outcome = RefreshCoordinator::new()
                .renew(
                    &session,
                    &stale,
                    || async { Ok(body.clone()) },
                    || expired.set(true),
                )
                .await;
            assert!(matches!(outcome, RenewOutcome::Retry));
            assert_eq!(session.token().as_deref(), Some("tok-B"));
            assert!(!expired.get());
        }
        Ok(())
    }

    #[tokio::test]
    async fn skips_call_when_generation_already_moved() -> Result<()> {
        let session = authenticated()?;
        let stale = session.credential();
        session.attach_token("tok-B")?;
        let called = Cell::new(false);
        let outcome = RefreshCoordinator::new()
            .renew(
                &session,
                &stale,
                || {
                    called.set(true);
                    async { Ok(Value::Null) }
                },
                || {},
            )
            .await;
        assert!(matches!(outcome, RenewOutcome::Retry));
        assert!(!called.get());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_response_expires() -> Result<()> {
        let session = authenticated()?;
        let stale = session.credential();
        let expired = Cell::new(false);
        let outcome = RefreshCoordinator::new()
            .renew(
                &session,
                &stale,
                || async { Ok(json!({ "status": "ok" })) },
                || expired.set(true),
            )
            .await;
        assert!(matches!(outcome, RenewOutcome::Ended));
        assert!(expired.get());
        Ok(())
    }

    #[tokio::test]
    async fn network_failure_leaves_session_alone() -> Result<()> {
        let session = authenticated()?;
        let stale = session.credential();
        let expired = Cell::new(false);
        let outcome = RefreshCoordinator::new()
            .renew(
                &session,
                &stale,
                || async {
                    Err(ApiError::NetworkUnavailable {
                        failure: crate::error::NetworkFailure::Connect,
                        detail: "connection refused".into(),
                    })
                },
                || expired.set(true),
            )
            .await;
        assert!(matches!(outcome, RenewOutcome::Unavailable(_)));
        assert!(!expired.get());
        assert_eq!(session.token().as_deref(), Some("tok-A"));
        Ok(())
    }
}
