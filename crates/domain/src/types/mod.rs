//! Wire types exchanged with the HotelOps backend

pub mod auth;
pub mod pagination;
pub mod user;

pub use auth::{
    ForgotPasswordResponse, LoginOutcome, LoginRequest, RegisterRequest, ResetPasswordRequest,
    TokenGrant, VerifyOtpRequest, VerifyOtpResponse,
};
pub use pagination::{Envelope, Page, Pagination};
pub use user::{Department, Role, User};
