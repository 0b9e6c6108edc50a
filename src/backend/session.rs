//! Session state and auth-change notification.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::backend::types::Session;

/// Auth state delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedIn(Session),
    SignedOut,
}

/// Token returned by [`SessionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type AuthHandler = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct SessionInner {
    session: RwLock<Option<Session>>,
    handlers: Mutex<HashMap<u64, AuthHandler>>,
    next_id: AtomicU64,
}

/// Shared holder for the current session.
///
/// Every session change notifies the registered handlers with the new
/// state. Handlers run outside the registry lock, so they may subscribe
/// or unsubscribe freely.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Create an empty store with no session and no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, if signed in.
    pub fn get(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Replace the session and notify subscribers with the new state.
    pub fn set(&self, session: Option<Session>) {
        let state = match &session {
            Some(s) => AuthState::SignedIn(s.clone()),
            None => AuthState::SignedOut,
        };

        *self.inner.session.write().expect("session lock poisoned") = session;

        let handlers: Vec<AuthHandler> = {
            let registry = self.inner.handlers.lock().expect("handler lock poisoned");
            registry.values().cloned().collect()
        };
        for handler in handlers {
            handler(&state);
        }
    }

    /// Register a handler for auth-state changes.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .lock()
            .expect("handler lock poisoned")
            .insert(id, Arc::new(handler));
        SubscriptionId(id)
    }

    /// Remove a handler. Returns false if the token was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner
            .handlers
            .lock()
            .expect("handler lock poisoned")
            .remove(&id.0)
            .is_some()
    }
}
