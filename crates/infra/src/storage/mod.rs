//! Persisted session state
//!
//! A small cookie-like key/value file holds the access token (`_at`) and the
//! signed-in profile (`user`) so a session survives a restart. In-memory
//! stores back tests and ephemeral sessions.

pub mod key_value;
pub mod token_store;
pub mod user_store;

pub use key_value::FileKeyValueStore;
pub use token_store::{MemoryTokenStore, PersistedTokenStore};
pub use user_store::{MemoryUserStore, PersistedUserStore};
