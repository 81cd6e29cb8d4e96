//! # HotelOps Domain
//!
//! Domain types shared by the HotelOps admin console session client.
//!
//! This crate contains:
//! - Configuration structures
//! - Domain error types and Result definitions
//! - Storage keys, endpoint paths and policy defaults
//! - Wire types exchanged with the HotelOps backend
//!
//! ## Architecture
//! - No dependencies on other HotelOps crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
