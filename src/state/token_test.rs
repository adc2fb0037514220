use super::*;
use crate::storage::MemoryStorage;

struct BrokenStorage;

impl Storage for BrokenStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }
}

#[test]
fn read_without_save_is_absent() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
    assert_eq!(tokens.read(), None);
}

#[test]
fn save_then_read_returns_same_token() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
    tokens.save("eyJ.abc.def").unwrap();
    assert_eq!(tokens.read().as_deref(), Some("eyJ.abc.def"));
}

#[test]
fn save_overwrites_previous_token() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
    tokens.save("first").unwrap();
    tokens.save("second").unwrap();
    assert_eq!(tokens.read().as_deref(), Some("second"));
}

#[test]
fn clear_removes_token() {
    let storage = Arc::new(MemoryStorage::new());
    let tokens = TokenStore::new(storage.clone());
    tokens.save("t").unwrap();
    tokens.clear().unwrap();
    assert_eq!(tokens.read(), None);
    assert!(storage.is_empty());
}

#[test]
fn empty_string_reads_as_absent() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
    tokens.save("").unwrap();
    assert_eq!(tokens.read(), None);
}

#[test]
fn broken_storage_reads_as_absent() {
    let tokens = TokenStore::new(Arc::new(BrokenStorage));
    assert_eq!(tokens.read(), None);
    assert!(tokens.save("t").is_err());
}
