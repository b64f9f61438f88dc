//! Session storage port.
//!
//! A flat string key/value store holding the signed-in account between
//! runs, the same role browser local storage plays for a web client.

use std::future::Future;

use automazap_types::error::StorageError;
use dashmap::DashMap;

/// Key under which the signed-in account profile is persisted.
pub const SESSION_KEY: &str = "automazap_user";

/// Key/value persistence for session data.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait SessionStorage: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Set a value for a key (upsert).
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// In-process session storage. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: DashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get(SESSION_KEY).await.unwrap(), None);

        storage.set(SESSION_KEY, "{}").await.unwrap();
        assert_eq!(storage.get(SESSION_KEY).await.unwrap().as_deref(), Some("{}"));

        storage.set(SESSION_KEY, "[]").await.unwrap();
        assert_eq!(storage.get(SESSION_KEY).await.unwrap().as_deref(), Some("[]"));

        storage.remove(SESSION_KEY).await.unwrap();
        storage.remove(SESSION_KEY).await.unwrap();
        assert_eq!(storage.get(SESSION_KEY).await.unwrap(), None);
    }
}
