//! # HotelOps Infrastructure
//!
//! Implementations of the session client's ports and its I/O.
//!
//! This crate contains:
//! - Configuration loading (environment and JSON/TOML files)
//! - HTTP transport sharing one cookie jar between clients
//! - Persisted token and profile stores
//! - The session layer: single-flight refresh, proactive refresh timer,
//!   startup bootstrap
//! - The authenticated request pipeline and auth endpoints
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `hotelops-core`
//! - Depends on `hotelops-domain` and `hotelops-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;
pub mod storage;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ApiErrorCategory, AuthApi, RequestOptions};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use session::{RefreshCoordinator, RefreshScheduler, Session, SessionBootstrap};
pub use storage::{FileKeyValueStore, MemoryTokenStore, MemoryUserStore};
