//! Port interfaces for session persistence
//!
//! These traits define the boundaries between the session layer and the
//! storage backing it (a cookie-like file on disk, or memory in tests).

use async_trait::async_trait;
use hotelops_domain::{Result, User};

use super::StoredToken;

/// Persistence of the current access token
///
/// Every write replaces the whole record in one step, so readers observe
/// either the previous token or the new one, never a mix.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, if any
    async fn get(&self) -> Result<Option<StoredToken>>;

    /// Replace the current token
    async fn set(&self, token: StoredToken) -> Result<()>;

    /// Remove the current token (no-op when absent)
    async fn clear(&self) -> Result<()>;
}

/// Persistence of the signed-in user profile
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stored profile, if any
    async fn get(&self) -> Result<Option<User>>;

    /// Replace the stored profile
    async fn set(&self, user: User) -> Result<()>;

    /// Remove the stored profile (no-op when absent)
    async fn clear(&self) -> Result<()>;
}
