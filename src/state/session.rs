//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionState` is the single source of truth for "who is logged in". The
//! auth guard, the request pipeline and the CLI all read it through a shared
//! `Arc<SessionState>`; nothing else holds a copy of the flag.
//!
//! DESIGN
//! ======
//! Every mutation publishes on a `watch` channel before it returns and is
//! mirrored into storage as a versioned snapshot, so a restart restores the
//! last known session without a network call. `reset` also clears the token
//! store: a reset session never outlives its token and vice versa.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::token::TokenStore;
use crate::net::types::UserProfile;
use crate::storage::{Storage, StorageError};

/// Storage key holding the session snapshot.
pub const SESSION_KEY: &str = "persist:auth";

/// Snapshot shape version. Snapshots with another version are discarded.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Logged-in flag plus profile. `user` is present exactly when authenticated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRepr", into = "SessionRepr")]
pub struct Session {
    user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub fn authenticated(user: UserProfile) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

#[derive(Serialize, Deserialize)]
struct SessionRepr {
    #[serde(rename = "isAuthenticated")]
    is_authenticated: bool,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl TryFrom<SessionRepr> for Session {
    type Error = String;

    fn try_from(repr: SessionRepr) -> Result<Self, Self::Error> {
        match (repr.is_authenticated, repr.user) {
            (true, Some(user)) => Ok(Self::authenticated(user)),
            (false, None) => Ok(Self::anonymous()),
            (true, None) => Err("authenticated session without user".to_owned()),
            (false, Some(_)) => Err("anonymous session with user".to_owned()),
        }
    }
}

impl From<Session> for SessionRepr {
    fn from(session: Session) -> Self {
        Self { is_authenticated: session.is_authenticated(), user: session.user }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    auth: Session,
}

/// Decode a stored snapshot; `None` when missing, malformed or outdated.
fn decode_snapshot(raw: Option<&str>) -> Option<Session> {
    let raw = raw?;
    match serde_json::from_str::<Snapshot>(raw) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Some(snapshot.auth),
        Ok(snapshot) => {
            tracing::debug!(version = snapshot.version, "discarding session snapshot with old version");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "discarding malformed session snapshot");
            None
        }
    }
}

pub struct SessionState {
    tx: watch::Sender<Session>,
    storage: Arc<dyn Storage>,
    tokens: TokenStore,
}

impl SessionState {
    /// Rehydrate from `storage`, defaulting to an anonymous session.
    #[must_use]
    pub fn initialize(storage: Arc<dyn Storage>) -> Self {
        let raw = match storage.get_item(SESSION_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "session snapshot unreadable");
                None
            }
        };
        let session = decode_snapshot(raw.as_deref()).unwrap_or_default();
        let (tx, _rx) = watch::channel(session);
        let tokens = TokenStore::new(storage.clone());
        Self { tx, storage, tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Observe session changes. The receiver sees each mutation as soon as
    /// the mutating call has published it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Mark the session authenticated. The snapshot is written first; on a
    /// storage failure nothing is published.
    pub fn set_authenticated(&self, user: UserProfile) -> Result<(), StorageError> {
        let email = user.email.clone();
        let next = Session::authenticated(user);
        self.persist(&next)?;
        self.publish(next);
        tracing::info!(%email, "session authenticated");
        Ok(())
    }

    /// Store the freshly issued token and mark the session authenticated.
    /// A failed session write removes the token again.
    pub fn login(&self, token: &str, user: UserProfile) -> Result<(), StorageError> {
        self.tokens.save(token)?;
        if let Err(e) = self.set_authenticated(user) {
            if let Err(clear) = self.tokens.clear() {
                tracing::warn!(error = %clear, "token rollback failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Drop the session and its token. Safe to call repeatedly.
    ///
    /// In-memory state is always reset; the first storage failure, if any,
    /// is returned.
    pub fn reset(&self) -> Result<(), StorageError> {
        let cleared = self.tokens.clear();
        if self.publish(Session::anonymous()) {
            tracing::info!("session reset");
        }
        let persisted = self.persist(&Session::anonymous());
        cleared.and(persisted)
    }

    fn publish(&self, next: Session) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let snapshot = Snapshot { version: SNAPSHOT_VERSION, auth: session.clone() };
        let raw = serde_json::to_string(&snapshot)?;
        self.storage.set_item(SESSION_KEY, &raw)
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("session", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}
