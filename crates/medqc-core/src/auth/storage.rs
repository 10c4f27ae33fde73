use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Session storage is unavailable")]
    Unavailable,
}

/// Key/value storage that lives exactly as long as one client session.
///
/// Implementations must tolerate concurrent use: two in-flight requests may
/// both clear the session at the same time.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage; dropped with the process, never shared.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Unavailable)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Unavailable)?;
        items.remove(key);
        Ok(())
    }
}

/// Backend for environments without session storage: reads see nothing,
/// writes fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl SessionStorage for UnavailableStorage {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k"), None);

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));

        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k"), None);

        // Removing again is fine
        storage.remove_item("k").unwrap();
    }

    #[test]
    fn test_unavailable_storage() {
        let storage = UnavailableStorage;
        assert_eq!(storage.set_item("k", "v"), Err(StorageError::Unavailable));
        assert_eq!(storage.get_item("k"), None);
    }
}
