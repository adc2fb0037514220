//! Bearer token persistence.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::sync::Arc;

use crate::storage::{Storage, StorageError};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Opaque storage for the single bearer token. No validation happens here.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Persist `token`, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    /// The persisted token. Unreadable storage counts as absent.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token read failed; treating as absent");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
