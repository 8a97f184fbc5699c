//! Authentication state shared by every outbound request.
//!
//! # Design
//! - One explicitly constructed `Session` per app instance, injected into the
//!   client; no ambient globals.
//! - Every mutation happens under a single mutex together with its store
//!   write, so check-and-set transitions are atomic.
//! - Each token change bumps a generation counter. Requests remember the
//!   generation they were sent with, which lets a late 401 for an old token
//!   be told apart from a 401 for the current one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use socialpet_api_models::AuthUser;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{KeyValueStore, StoreError};

/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Store key holding the cached user profile (JSON).
pub const USER_KEY: &str = "user";

/// Lifecycle state of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token.
    Anonymous,
    /// Token present and assumed valid.
    Authenticated,
    /// A 401 was observed; token cleared, redirect in progress.
    Expiring,
}

/// Cached profile of the signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Name shown in the UI.
    pub display_name: String,
    /// Role name (`USER`, `ADMIN`, ...).
    pub role: String,
}

impl From<&AuthUser> for UserProfile {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.user_id.clone(),
            email: user.email.clone(),
            display_name: user.display_name(),
            role: user.role.clone(),
        }
    }
}

/// Point-in-time copy of the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Lifecycle state.
    pub state: SessionState,
    /// Bearer token, when authenticated.
    pub token: Option<String>,
    /// Cached profile, when known.
    pub user: Option<UserProfile>,
    /// Counter bumped on every token change.
    pub generation: u64,
}

impl SessionSnapshot {
    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Errors raised by session mutations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An empty or blank token was supplied.
    #[error("token must not be empty")]
    EmptyToken,
    /// The operation requires an authenticated session.
    #[error("session is not authenticated")]
    NotAuthenticated,
    /// The user profile could not be encoded for persistence.
    #[error("failed to encode user profile")]
    EncodeUser {
        /// Source encode error.
        source: serde_json::Error,
    },
    /// Persisting the change failed.
    #[error("failed to persist session")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: StoreError,
    },
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

/// Proof that the caller won the expiry check-and-set.
#[derive(Debug)]
#[must_use = "an expiry ticket must be passed to `Session::finish_expiry`"]
pub struct ExpiryTicket {
    generation: u64,
}

/// Token and generation captured when a request is dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Credential {
    pub(crate) token: Option<String>,
    pub(crate) generation: u64,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    token: Option<String>,
    user: Option<UserProfile>,
    generation: u64,
}

impl SessionInner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            token: self.token.clone(),
            user: self.user.clone(),
            generation: self.generation,
        }
    }
}

/// Authentication state for one running app instance.
pub struct Session {
    inner: Mutex<SessionInner>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        formatter
            .debug_struct("Session")
            .field("state", &inner.state)
            .field("has_token", &inner.token.is_some())
            .field("generation", &inner.generation)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build the session from whatever the store holds.
    ///
    /// A non-blank persisted token starts the session `Authenticated` without
    /// contacting the server; the first real request validates it. A cached
    /// user without a token is removed from the store.
    #[must_use]
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let token = store
            .get_string(TOKEN_KEY)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let user = if token.is_some() {
            store
                .get_string(USER_KEY)
                .and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
                    Ok(user) => Some(user),
                    Err(err) => {
                        warn!(error = %err, "ignoring unreadable cached user profile");
                        None
                    }
                })
        } else {
            for key in [TOKEN_KEY, USER_KEY] {
                if store.get_string(key).is_some() {
                    if let Err(err) = store.delete(key) {
                        warn!(error = %err, key, "failed to drop orphaned session entry");
                    }
                }
            }
            None
        };

        let state = if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        debug!(?state, has_user = user.is_some(), "session restored");

        Self {
            inner: Mutex::new(SessionInner {
                state,
                token,
                user,
                generation: 0,
            }),
            store,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Cached profile of the signed-in account.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    /// Store a new bearer token and enter `Authenticated`.
    ///
    /// The cached profile is kept; callers that know the account should use
    /// [`Session::establish`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for blank tokens and
    /// [`SessionError::Store`] when the token could not be persisted (the
    /// in-memory session is left unchanged in that case).
    pub fn attach_token(&self, token: impl Into<String>) -> SessionResult<()> {
        let token = normalize_token(token.into())?;
        let mut inner = self.lock();
        self.store
            .set(TOKEN_KEY, &token)
            .map_err(|source| SessionError::Store {
                operation: "session.attach_token",
                source,
            })?;
        inner.token = Some(token);
        inner.state = SessionState::Authenticated;
        inner.generation = inner.generation.wrapping_add(1);
        info!(generation = inner.generation, "session token attached");
        Ok(())
    }

    /// Store a token together with the account it belongs to (login flow).
    ///
    /// # Errors
    ///
    /// Same as [`Session::attach_token`], plus [`SessionError::EncodeUser`].
    pub fn establish(&self, token: impl Into<String>, user: UserProfile) -> SessionResult<()> {
        let token = normalize_token(token.into())?;
        let encoded =
            serde_json::to_string(&user).map_err(|source| SessionError::EncodeUser { source })?;
        let mut inner = self.lock();
        self.store
            .set(TOKEN_KEY, &token)
            .and_then(|()| self.store.set(USER_KEY, &encoded))
            .map_err(|source| SessionError::Store {
                operation: "session.establish",
                source,
            })?;
        inner.token = Some(token);
        inner.user = Some(user);
        inner.state = SessionState::Authenticated;
        inner.generation = inner.generation.wrapping_add(1);
        info!(generation = inner.generation, "session established");
        Ok(())
    }

    /// Replace the cached profile of the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a token, plus
    /// encode/store failures.
    pub fn set_user(&self, user: UserProfile) -> SessionResult<()> {
        let encoded =
            serde_json::to_string(&user).map_err(|source| SessionError::EncodeUser { source })?;
        let mut inner = self.lock();
        if inner.state != SessionState::Authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        self.store
            .set(USER_KEY, &encoded)
            .map_err(|source| SessionError::Store {
                operation: "session.set_user",
                source,
            })?;
        inner.user = Some(user);
        Ok(())
    }

    /// Explicit logout. Always leaves the in-memory session `Anonymous`;
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the persisted token or profile
    /// could not be removed.
    pub fn clear_token(&self) -> SessionResult<()> {
        let mut inner = self.lock();
        inner.token = None;
        inner.user = None;
        inner.state = SessionState::Anonymous;
        inner.generation = inner.generation.wrapping_add(1);
        let result = self.erase_persisted();
        drop(inner);
        info!("session cleared");
        result.map_err(|source| SessionError::Store {
            operation: "session.clear_token",
            source,
        })
    }

    /// Begin session expiry for a 401 received by a request dispatched at
    /// `generation`.
    ///
    /// Only the first caller of an episode gets a ticket: the session must be
    /// `Authenticated` with the same generation. Callers arriving while the
    /// session is already expiring, anonymous, or holding a newer token get
    /// `None` and must not redirect.
    #[must_use]
    pub fn begin_expiry(&self, generation: u64) -> Option<ExpiryTicket> {
        let mut inner = self.lock();
        if inner.state != SessionState::Authenticated || inner.generation != generation {
            debug!(
                state = ?inner.state,
                current = inner.generation,
                observed = generation,
                "401 ignored; expiry already handled or token replaced"
            );
            return None;
        }
        inner.state = SessionState::Expiring;
        inner.token = None;
        inner.user = None;
        inner.generation = inner.generation.wrapping_add(1);
        if let Err(err) = self.erase_persisted() {
            warn!(error = %err, "failed to erase persisted session during expiry");
        }
        Some(ExpiryTicket {
            generation: inner.generation,
        })
    }

    /// Complete an expiry started by [`Session::begin_expiry`]. A login that
    /// happened in between wins and is left untouched.
    pub fn finish_expiry(&self, ticket: ExpiryTicket) {
        let mut inner = self.lock();
        if inner.state == SessionState::Expiring && inner.generation == ticket.generation {
            inner.state = SessionState::Anonymous;
        }
    }

    /// Replace the token of a session still at `generation` (token refresh).
    /// Returns `false` when the session moved on in the meantime.
    pub(crate) fn rotate(&self, generation: u64, token: &str) -> bool {
        let Ok(token) = normalize_token(token.to_string()) else {
            return false;
        };
        let mut inner = self.lock();
        if inner.state != SessionState::Authenticated || inner.generation != generation {
            return false;
        }
        if let Err(err) = self.store.set(TOKEN_KEY, &token) {
            warn!(error = %err, "failed to persist refreshed token");
        }
        inner.token = Some(token);
        inner.generation = inner.generation.wrapping_add(1);
        debug!(generation = inner.generation, "session token refreshed");
        true
    }

    pub(crate) fn credential(&self) -> Credential {
        let inner = self.lock();
        Credential {
            token: inner.token.clone(),
            generation: inner.generation,
        }
    }

    fn erase_persisted(&self) -> Result<(), StoreError> {
        let token = self.store.delete(TOKEN_KEY);
        let user = self.store.delete(USER_KEY);
        token.and(user)
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize_token(token: String) -> SessionResult<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyToken);
    }
    if trimmed.len() == token.len() {
        Ok(token)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use anyhow::Result;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".into(),
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            role: "USER".into(),
        }
    }

    fn memory_session() -> (Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::new());
        let session = Session::restore(store.clone());
        (store, session)
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get_string(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> crate::store::StoreResult<()> {
            Err(StoreError::Io {
                operation: "test.set",
                path: "memory".into(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn delete(&self, _key: &str) -> crate::store::StoreResult<()> {
            Err(StoreError::Io {
                operation: "test.delete",
                path: "memory".into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn starts_anonymous_with_empty_store() {
        let (_store, session) = memory_session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Anonymous);
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.user.is_none());
    }

    #[test]
    fn restores_persisted_token_optimistically() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok-A")?;
        store.set(USER_KEY, &serde_json::to_string(&profile())?)?;
        let session = Session::restore(store);
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.token().as_deref(), Some("tok-A"));
        assert_eq!(session.user(), Some(profile()));
        Ok(())
    }

    #[test]
    fn restore_drops_orphaned_user_and_blank_token() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "   ")?;
        store.set(USER_KEY, &serde_json::to_string(&profile())?)?;
        let session = Session::restore(store.clone());
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.user().is_none());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn restore_ignores_unreadable_user() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok-A")?;
        store.set(USER_KEY, "{not json")?;
        let session = Session::restore(store);
        assert!(session.is_authenticated());
        assert!(session.user().is_none());
        Ok(())
    }

    #[test]
    fn attach_and_clear_round_trip_through_restart() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");

        let session = Session::restore(Arc::new(FileStore::open(&path)?));
        session.attach_token("tok-A")?;
        drop(session);

        let restarted = Session::restore(Arc::new(FileStore::open(&path)?));
        assert_eq!(restarted.token().as_deref(), Some("tok-A"));
        assert_eq!(restarted.state(), SessionState::Authenticated);
        restarted.clear_token()?;
        drop(restarted);

        let restarted = Session::restore(Arc::new(FileStore::open(&path)?));
        assert!(restarted.token().is_none());
        assert_eq!(restarted.state(), SessionState::Anonymous);
        Ok(())
    }

    #[test]
    fn attach_rejects_blank_tokens_and_trims() -> Result<()> {
        let (store, session) = memory_session();
        assert!(matches!(
            session.attach_token("  "),
            Err(SessionError::EmptyToken)
        ));
        assert_eq!(session.state(), SessionState::Anonymous);
        session.attach_token(" tok-A\n")?;
        assert_eq!(session.token().as_deref(), Some("tok-A"));
        assert_eq!(store.get_string(TOKEN_KEY).as_deref(), Some("tok-A"));
        Ok(())
    }

    #[test]
    fn attach_failure_leaves_session_untouched() {
        let session = Session::restore(Arc::new(FailingStore));
        assert!(matches!(
            session.attach_token("tok-A"),
            Err(SessionError::Store { .. })
        ));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.token().is_none());
    }

    #[test]
    fn clear_token_empties_memory_even_when_store_fails() {
        let session = Session::restore(Arc::new(FailingStore));
        assert!(session.clear_token().is_err());
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[test]
    fn establish_persists_user_and_clear_removes_it() -> Result<()> {
        let (store, session) = memory_session();
        session.establish("tok-A", profile())?;
        assert_eq!(session.user(), Some(profile()));
        assert!(store.get_string(USER_KEY).is_some());
        session.clear_token()?;
        assert!(session.user().is_none());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn set_user_requires_authentication() -> Result<()> {
        let (_store, session) = memory_session();
        assert!(matches!(
            session.set_user(profile()),
            Err(SessionError::NotAuthenticated)
        ));
        session.attach_token("tok-A")?;
        session.set_user(profile())?;
        assert_eq!(session.user(), Some(profile()));
        Ok(())
    }

    #[test]
    fn expiry_is_granted_once_per_episode() -> Result<()> {
        let (store, session) = memory_session();
        session.attach_token("tok-A")?;
        let generation = session.credential().generation;

        let ticket = session.begin_expiry(generation);
        assert!(ticket.is_some());
        assert_eq!(session.state(), SessionState::Expiring);
        assert!(session.token().is_none());
        assert!(store.get_string(TOKEN_KEY).is_none());

        assert!(session.begin_expiry(generation).is_none());
        if let Some(ticket) = ticket {
            session.finish_expiry(ticket);
        }
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.begin_expiry(generation).is_none());
        Ok(())
    }

    #[test]
    fn stale_401_does_not_end_a_newer_session() -> Result<()> {
        let (_store, session) = memory_session();
        session.attach_token("tok-A")?;
        let stale = session.credential().generation;
        session.attach_token("tok-B")?;

        assert!(session.begin_expiry(stale).is_none());
        assert_eq!(session.token().as_deref(), Some("tok-B"));
        Ok(())
    }

    #[test]
    fn login_during_expiry_survives_finish() -> Result<()> {
        let (_store, session) = memory_session();
        session.attach_token("tok-A")?;
        let generation = session.credential().generation;
        let ticket = session.begin_expiry(generation);
        session.attach_token("tok-B")?;
        if let Some(ticket) = ticket {
            session.finish_expiry(ticket);
        }
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.token().as_deref(), Some("tok-B"));
        Ok(())
    }

    #[test]
    fn rotate_requires_matching_generation() -> Result<()> {
        let (store, session) = memory_session();
        session.attach_token("tok-A")?;
        let generation = session.credential().generation;
        assert!(session.rotate(generation, "tok-B"));
        assert_eq!(store.get_string(TOKEN_KEY).as_deref(), Some("tok-B"));
        assert!(!session.rotate(generation, "tok-C"));
        assert!(!session.rotate(generation + 1, " "));
        assert_eq!(session.token().as_deref(), Some("tok-B"));
        Ok(())
    }

    #[test]
    fn debug_output_hides_token() -> Result<()> {
        let (_store, session) = memory_session();
        session.attach_token("secret-token")?;
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("has_token: true"));
        Ok(())
    }
}
