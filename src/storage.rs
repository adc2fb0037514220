//! Durable key/value storage for session data.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store and the session snapshot both sit on top of a
//! `localStorage`-shaped contract: string keys, string values, last write wins.
//! `FileStorage` is the durable backend used by the CLI; `MemoryStorage` backs
//! tests and throwaway sessions.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` rewrites the whole file on every mutation. The store holds two
//! small keys, so simplicity wins over incremental writes.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value store with `localStorage` semantics.
pub trait Storage: Send + Sync {
    /// Returns the stored value for `key`, or `None` when unset.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.items).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.items).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-object file in a state directory.
///
/// The mutex serializes read-modify-write cycles within the process; other
/// processes sharing the directory see whole-file replacements only.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    /// Open (lazily) the store under `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self { path: dir.join(STORAGE_FILE), guard: Mutex::new(()) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt { path: self.path.clone(), reason: e.to_string() })
    }

    /// Current contents as the base for a mutation, plus whether the file
    /// was corrupt. A corrupt file is replaced rather than blocking every
    /// later write.
    fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.load() {
            Ok(items) => Ok((items, false)),
            Err(StorageError::Corrupt { path, reason }) => {
                tracing::warn!(path = %path.display(), %reason, "overwriting corrupt storage file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn store(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _held = lock(&self.guard);
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _held = lock(&self.guard);
        let (mut items, _) = self.load_for_write()?;
        items.insert(key.to_owned(), value.to_owned());
        self.store(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _held = lock(&self.guard);
        let (mut items, corrupt) = self.load_for_write()?;
        if items.remove(key).is_some() || corrupt {
            self.store(&items)?;
        }
        Ok(())
    }
}
