use super::*;
use crate::storage::MemoryStorage;
use serde_json::json;

fn alice() -> UserProfile {
    UserProfile::new("alice@example.com")
}

fn fresh() -> (Arc<MemoryStorage>, SessionState) {
    let storage = Arc::new(MemoryStorage::new());
    let state = SessionState::initialize(storage.clone());
    (storage, state)
}

// =============================================================
// Session
// =============================================================

#[test]
fn session_default_is_anonymous() {
    let session = Session::default();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
}

#[test]
fn session_serializes_original_shape() {
    let session = Session::authenticated(alice());
    let value = serde_json::to_value(&session).unwrap();
    assert_eq!(value, json!({ "isAuthenticated": true, "user": { "email": "alice@example.com" } }));
}

#[test]
fn session_rejects_flag_without_user() {
    let err = serde_json::from_value::<Session>(json!({ "isAuthenticated": true, "user": null }));
    assert!(err.is_err());
}

#[test]
fn session_rejects_user_without_flag() {
    let err = serde_json::from_value::<Session>(json!({ "isAuthenticated": false, "user": { "email": "x@y.z" } }));
    assert!(err.is_err());
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_without_snapshot_is_anonymous() {
    let (_, state) = fresh();
    assert!(!state.is_authenticated());
}

#[test]
fn initialize_restores_persisted_session() {
    let storage = Arc::new(MemoryStorage::new());
    SessionState::initialize(storage.clone()).set_authenticated(alice()).unwrap();

    let restored = SessionState::initialize(storage);
    assert!(restored.is_authenticated());
    assert_eq!(restored.current().user().map(|u| u.email.as_str()), Some("alice@example.com"));
}

#[test]
fn initialize_ignores_malformed_snapshot() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(SESSION_KEY, "{not json").unwrap();
    assert!(!SessionState::initialize(storage).is_authenticated());
}

#[test]
fn initialize_ignores_other_snapshot_version() {
    let storage = Arc::new(MemoryStorage::new());
    let raw = json!({ "version": 0, "auth": { "isAuthenticated": true, "user": { "email": "a@b.co" } } });
    storage.set_item(SESSION_KEY, &raw.to_string()).unwrap();
    assert!(!SessionState::initialize(storage).is_authenticated());
}

#[test]
fn initialize_ignores_inconsistent_snapshot() {
    let storage = Arc::new(MemoryStorage::new());
    let raw = json!({ "version": 1, "auth": { "isAuthenticated": true, "user": null } });
    storage.set_item(SESSION_KEY, &raw.to_string()).unwrap();
    assert!(!SessionState::initialize(storage).is_authenticated());
}

// =============================================================
// mutations
// =============================================================

#[test]
fn login_writes_token_and_session() {
    let (_, state) = fresh();
    state.login("tok", alice()).unwrap();
    assert!(state.is_authenticated());
    assert_eq!(state.tokens().read().as_deref(), Some("tok"));
}

#[test]
fn reset_clears_token_and_session() {
    let (storage, state) = fresh();
    state.login("tok", alice()).unwrap();

    state.reset().unwrap();

    assert!(!state.is_authenticated());
    assert_eq!(state.tokens().read(), None);
    let raw = storage.get_item(SESSION_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, json!({ "version": 1, "auth": { "isAuthenticated": false, "user": null } }));
}

#[test]
fn reset_twice_matches_reset_once() {
    let (storage_once, once) = fresh();
    once.login("tok", alice()).unwrap();
    once.reset().unwrap();

    let (storage_twice, twice) = fresh();
    twice.login("tok", alice()).unwrap();
    twice.reset().unwrap();
    twice.reset().unwrap();

    assert_eq!(once.current(), twice.current());
    assert_eq!(once.tokens().read(), twice.tokens().read());
    assert_eq!(storage_once.get_item(SESSION_KEY).unwrap(), storage_twice.get_item(SESSION_KEY).unwrap());
    assert_eq!(storage_once.len(), storage_twice.len());
}

// =============================================================
// subscribe
// =============================================================

#[test]
fn subscribers_observe_mutations_synchronously() {
    let (_, state) = fresh();
    let mut rx = state.subscribe();

    state.set_authenticated(alice()).unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated());

    state.reset().unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated());
}

#[test]
fn redundant_reset_does_not_notify() {
    let (_, state) = fresh();
    let rx = state.subscribe();
    state.reset().unwrap();
    assert!(!rx.has_changed().unwrap());
}

// =============================================================
// storage failures
// =============================================================

/// Memory storage whose session snapshot writes fail.
#[derive(Default)]
struct SnapshotWriteFails {
    inner: MemoryStorage,
}

impl Storage for SnapshotWriteFails {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == SESSION_KEY {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

#[test]
fn failed_snapshot_write_leaves_session_anonymous() {
    let state = SessionState::initialize(Arc::new(SnapshotWriteFails::default()));
    let rx = state.subscribe();

    assert!(state.set_authenticated(alice()).is_err());

    assert!(!state.is_authenticated());
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn failed_login_rolls_back_token() {
    let state = SessionState::initialize(Arc::new(SnapshotWriteFails::default()));

    let err = state.login("tok", alice()).unwrap_err();

    assert!(matches!(err, StorageError::Io(_)));
    assert!(!state.is_authenticated());
    assert_eq!(state.tokens().read(), None);
}

#[test]
fn login_recovers_from_corrupt_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(crate::storage::FileStorage::open(dir.path()).unwrap());
    std::fs::write(storage.path(), "{truncated").unwrap();

    let state = SessionState::initialize(storage.clone());
    assert!(!state.is_authenticated());

    state.login("tok", alice()).unwrap();
    state.reset().unwrap();
    state.login("tok2", alice()).unwrap();

    let restored = SessionState::initialize(storage);
    assert!(restored.is_authenticated());
    assert_eq!(restored.tokens().read().as_deref(), Some("tok2"));
}
