//! JSON key/value file with atomic replacement
//!
//! The whole file is one JSON object. Every write goes to a sibling temp file
//! that is then renamed over the original, so a crash mid-write leaves the
//! previous contents intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hotelops_domain::{HotelOpsError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::InfraError;

type Entries = BTreeMap<String, Value>;

/// Cookie-like persisted key/value store
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode one entry.
    ///
    /// # Errors
    /// Returns `HotelOpsError::Storage` if the file cannot be read, or
    /// `HotelOpsError::InvalidInput` if the entry does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;

        match entries.remove(key) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| HotelOpsError::from(InfraError::from(e))),
            None => Ok(None),
        }
    }

    /// Insert or replace one entry.
    ///
    /// # Errors
    /// Returns `HotelOpsError::Storage` if the file cannot be written.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| HotelOpsError::from(InfraError::from(e)))?;

        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries).await?;

        debug!(key, path = %self.path.display(), "stored session entry");
        Ok(())
    }

    /// Remove one entry; removing a missing key is a no-op.
    ///
    /// # Errors
    /// Returns `HotelOpsError::Storage` if the file cannot be written.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;

        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
            debug!(key, path = %self.path.display(), "removed session entry");
        }

        Ok(())
    }

    async fn read_entries(&self) -> Result<Entries> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(InfraError::from(e).into()),
        };

        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // unreadable session files are discarded on the next write
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                Ok(Entries::new())
            }
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|e| HotelOpsError::from(InfraError::from(e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await.map_err(InfraError::from)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(InfraError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> FileKeyValueStore {
        FileKeyValueStore::new(dir.path().join("nested").join("session.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let value: Option<String> = store.get("_at").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn set_get_remove_cycle() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("_at", &"T1").await.unwrap();
        store.set("user", &serde_json::json!({ "id": 3 })).await.unwrap();

        assert_eq!(store.get::<String>("_at").await.unwrap().as_deref(), Some("T1"));

        store.remove("_at").await.unwrap();
        assert!(store.get::<String>("_at").await.unwrap().is_none());

        let user: Option<Value> = store.get("user").await.unwrap();
        assert_eq!(user.unwrap()["id"], 3);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set("_at", &"persisted").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get::<String>("_at").await.unwrap().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_empty_and_replaced() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ definitely not json").unwrap();

        assert!(store.get::<String>("_at").await.unwrap().is_none());

        store.set("_at", &"T9").await.unwrap();
        assert_eq!(store.get::<String>("_at").await.unwrap().as_deref(), Some("T9"));
    }
}
