//! Error types used throughout the session client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for HotelOps
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HotelOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for HotelOps operations
pub type Result<T> = std::result::Result<T, HotelOpsError>;
