//! Backend API access
//!
//! - [`ApiClient`]: authenticated request pipeline with 401 refresh-and-replay
//! - [`AuthApi`]: login, profile, OTP password reset and logout
//! - [`ApiError`]: the single error shape returned to collaborators

pub mod auth;
pub mod client;
pub mod errors;
pub mod query;
pub mod request;

pub use auth::AuthApi;
pub use client::ApiClient;
pub use errors::{ApiError, ApiErrorCategory};
pub use request::{RequestDescriptor, RequestOptions};
