//! Access token persistence

use std::sync::Arc;

use async_trait::async_trait;
use hotelops_core::{StoredToken, TokenStore};
use hotelops_domain::constants::ACCESS_TOKEN_KEY;
use hotelops_domain::Result;
use parking_lot::RwLock;

use super::FileKeyValueStore;

/// Token store backed by the session file under the `_at` key
#[derive(Debug, Clone)]
pub struct PersistedTokenStore {
    kv: Arc<FileKeyValueStore>,
}

impl PersistedTokenStore {
    pub fn new(kv: Arc<FileKeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl TokenStore for PersistedTokenStore {
    async fn get(&self) -> Result<Option<StoredToken>> {
        Ok(self.kv.get::<StoredToken>(ACCESS_TOKEN_KEY).await?.filter(StoredToken::is_present))
    }

    async fn set(&self, token: StoredToken) -> Result<()> {
        self.kv.set(ACCESS_TOKEN_KEY, &token).await
    }

    async fn clear(&self) -> Result<()> {
        self.kv.remove(ACCESS_TOKEN_KEY).await
    }
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: StoredToken) -> Self {
        Self { token: RwLock::new(Some(token)) }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.read().clone().filter(StoredToken::is_present))
    }

    async fn set(&self, token: StoredToken) -> Result<()> {
        *self.token.write() = Some(token);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.token.write().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn persisted_token_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let kv = Arc::new(FileKeyValueStore::new(dir.path().join("session.json")));
        let store = PersistedTokenStore::new(Arc::clone(&kv));

        let expires = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        store.set(StoredToken::new("T1", Some(expires))).await.unwrap();

        let reopened = PersistedTokenStore::new(kv);
        assert_eq!(reopened.get().await.unwrap(), Some(StoredToken::new("T1", Some(expires))));

        reopened.clear().await.unwrap();
        assert!(reopened.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_bare_token_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "_at": "legacy" }"#).unwrap();

        let store = PersistedTokenStore::new(Arc::new(FileKeyValueStore::new(path)));
        assert_eq!(store.get().await.unwrap(), Some(StoredToken::new("legacy", None)));
    }

    #[tokio::test]
    async fn blank_token_reads_as_absent() {
        let store = MemoryTokenStore::with_token(StoredToken::new("", None));
        assert!(store.get().await.unwrap().is_none());

        store.set(StoredToken::new("T2", None)).await.unwrap();
        assert_eq!(store.get().await.unwrap().map(|t| t.value), Some("T2".to_string()));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }
}
