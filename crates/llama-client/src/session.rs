//! Authenticated session state
//!
//! The session lives in a [`SessionStore`] handed to whoever needs it. Every
//! mutation is written to the key/value store and broadcast to subscribers
//! through a `tokio::sync::watch` channel.

use crate::storage::KeyValueStore;
use crate::Result;
use llama_core::{RoleKind, SessionUser};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Version written next to the persisted state
pub const PERSIST_VERSION: u32 = 0;

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Logged-in user with the role merged in
    #[serde(default)]
    pub user: Option<SessionUser>,

    /// Whether a user is logged in
    #[serde(rename = "isAuthenticated", default)]
    pub is_authenticated: bool,
}

impl SessionState {
    /// Role of the logged-in user
    #[must_use]
    pub fn role_kind(&self) -> Option<RoleKind> {
        self.user.as_ref().map(SessionUser::role_kind)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistEnvelope {
    state: SessionState,
    #[serde(default)]
    version: u32,
}

/// Shared, persisted session
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    sender: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    /// Create a store over `storage` and rehydrate from `key`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(SessionState::default());
        let store = Self {
            storage,
            key: key.into(),
            sender: Arc::new(sender),
        };
        store.rehydrate();
        store
    }

    /// Reload the persisted state, replacing the in-memory one
    ///
    /// Missing or unreadable data yields a logged-out session.
    pub fn rehydrate(&self) {
        let state = match self.storage.get(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistEnvelope>(&raw) {
                Ok(envelope) => envelope.state,
                Err(err) => {
                    tracing::warn!(key = %self.key, error = %err, "stored session is corrupt, starting logged out");
                    SessionState::default()
                }
            },
            Ok(None) => SessionState::default(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "could not read stored session");
                SessionState::default()
            }
        };

        tracing::debug!(authenticated = state.is_authenticated, "session rehydrated");
        self.sender.send_replace(state);
    }

    /// Mark `user` as logged in with `token`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be persisted; the
    /// in-memory state is updated regardless.
    pub fn login(&self, user: SessionUser, token: impl Into<String>) -> Result<()> {
        tracing::info!(user = %user.display_name(), role = %user.role_kind(), "session started");
        self.apply(SessionState {
            token: Some(token.into()),
            user: Some(user),
            is_authenticated: true,
        })
    }

    /// Clear the session
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cleared session cannot be persisted.
    pub fn logout(&self) -> Result<()> {
        tracing::info!("session ended");
        self.apply(SessionState::default())
    }

    /// Current snapshot
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    /// Current bearer token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.sender.borrow().token.clone()
    }

    /// Whether a user is logged in
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_authenticated
    }

    /// Receive every subsequent change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    fn apply(&self, state: SessionState) -> Result<()> {
        let raw = serde_json::to_string(&PersistEnvelope {
            state: state.clone(),
            version: PERSIST_VERSION,
        })?;
        self.sender.send_replace(state);
        self.storage.set(&self.key, &raw)
    }
}
