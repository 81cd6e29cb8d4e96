//! # HotelOps Core
//!
//! Pure session logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Session value types (persisted token, session snapshot)
//! - Port/adapter interfaces (traits) for session persistence
//!
//! ## Architecture Principles
//! - Only depends on `hotelops-domain`
//! - No HTTP, filesystem, or timer code
//! - All external dependencies via traits

pub mod session;

pub use session::ports::{TokenStore, UserStore};
pub use session::{GrantLifetime, SessionSnapshot, StoredToken};
