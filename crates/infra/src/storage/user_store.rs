//! Signed-in profile persistence

use std::sync::Arc;

use async_trait::async_trait;
use hotelops_core::UserStore;
use hotelops_domain::constants::USER_KEY;
use hotelops_domain::{Result, User};
use parking_lot::RwLock;

use super::FileKeyValueStore;

/// User store backed by the session file under the `user` key
#[derive(Debug, Clone)]
pub struct PersistedUserStore {
    kv: Arc<FileKeyValueStore>,
}

impl PersistedUserStore {
    pub fn new(kv: Arc<FileKeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl UserStore for PersistedUserStore {
    async fn get(&self) -> Result<Option<User>> {
        self.kv.get(USER_KEY).await
    }

    async fn set(&self, user: User) -> Result<()> {
        self.kv.set(USER_KEY, &user).await
    }

    async fn clear(&self) -> Result<()> {
        self.kv.remove(USER_KEY).await
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    user: RwLock<Option<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self) -> Result<Option<User>> {
        Ok(self.user.read().clone())
    }

    async fn set(&self, user: User) -> Result<()> {
        *self.user.write() = Some(user);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.user.write().take();
        Ok(())
    }
}
