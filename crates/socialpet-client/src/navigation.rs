//! Bridge between the client and whatever owns the visible screen stack.
//!
//! # Design
//! - The client only ever asks for one thing: show the unauthenticated entry point.
//! - If no navigator is attached yet (app still starting), the intent is
//!   queued and delivered on attach instead of being dropped.
//! - A sign-in that happens before delivery cancels the queued intent.
//! - The navigator is always invoked outside the internal lock, so it may call
//!   back into the gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

/// Capability to switch the UI to the login entry point.
pub trait LoginNavigator: Send + Sync {
    /// Replace the visible stack with the unauthenticated entry point.
    fn navigate_to_login(&self);
}

impl<F> LoginNavigator for F
where
    F: Fn() + Send + Sync,
{
    fn navigate_to_login(&self) {
        self();
    }
}

/// What happened to a login request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The attached navigator was invoked.
    Dispatched,
    /// No navigator yet; delivered on the next [`NavigationGate::attach`].
    Queued,
}

#[derive(Default)]
struct GateInner {
    navigator: Option<Arc<dyn LoginNavigator>>,
    pending: bool,
}

/// Holder for the navigator with a one-slot intent queue.
#[derive(Default)]
pub struct NavigationGate {
    inner: Mutex<GateInner>,
}

impl std::fmt::Debug for NavigationGate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        formatter
            .debug_struct("NavigationGate")
            .field("attached", &inner.navigator.is_some())
            .field("pending", &inner.pending)
            .finish()
    }
}

impl NavigationGate {
    /// Create a gate with no navigator attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the navigator and flush a queued intent.
    pub fn attach(&self, navigator: Arc<dyn LoginNavigator>) {
        let flush = {
            let mut inner = self.lock();
            inner.navigator = Some(navigator.clone());
            std::mem::take(&mut inner.pending)
        };
        if flush {
            info!("delivering queued login navigation");
            navigator.navigate_to_login();
        }
    }

    /// Detach the current navigator; later requests are queued.
    pub fn detach(&self) -> Option<Arc<dyn LoginNavigator>> {
        self.lock().navigator.take()
    }

    /// Ask for the login entry point. Repeated requests while queued
    /// coalesce into a single delivery.
    pub fn request_login(&self) -> NavigationOutcome {
        let navigator = {
            let mut inner = self.lock();
            match inner.navigator.clone() {
                Some(navigator) => navigator,
                None => {
                    inner.pending = true;
                    debug!("navigator not attached; login navigation queued");
                    return NavigationOutcome::Queued;
                }
            }
        };
        navigator.navigate_to_login();
        NavigationOutcome::Dispatched
    }

    /// Drop a queued intent that has not been delivered yet. Returns whether
    /// one was pending.
    pub fn cancel_pending(&self) -> bool {
        let cancelled = std::mem::take(&mut self.lock().pending);
        if cancelled {
            debug!("queued login navigation cancelled");
        }
        cancelled
    }

    /// Whether an intent is waiting for a navigator.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock().pending
    }

    /// Whether a navigator is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lock().navigator.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
