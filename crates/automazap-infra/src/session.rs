//! File-backed session storage.
//!
//! Each key is stored as `{data_dir}/storage/{key}.json`.

use std::path::{Path, PathBuf};

use automazap_core::storage::SessionStorage;
use automazap_types::error::StorageError;

use crate::filesystem::storage_dir;

/// `SessionStorage` over plain files in the data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: storage_dir(data_dir),
        }
    }

    /// Path of the file backing `key`.
    ///
    /// Keys are restricted to ASCII alphanumerics, `-` and `_` so they cannot
    /// escape the storage directory.
    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Io(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| io_error(&path, e))?;
        tracing::debug!(key, "Session value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automazap_core::storage::SESSION_KEY;
    use tempfile::tempdir;

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        storage.set(SESSION_KEY, r#"{"id":"user-1"}"#).await.unwrap();

        let reopened = FileSessionStorage::new(dir.path());
        assert_eq!(
            reopened.get(SESSION_KEY).await.unwrap().as_deref(),
            Some(r#"{"id":"user-1"}"#)
        );
        assert!(dir.path().join("storage").join("automazap_user.json").exists());
    }

    #[tokio::test]
    async fn missing_key_reads_none_and_removes_cleanly() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        assert_eq!(storage.get("absent").await.unwrap(), None);
        storage.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_file() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        assert!(matches!(
            storage.set("../escape", "x").await,
            Err(StorageError::Io(_))
        ));
    }
}
