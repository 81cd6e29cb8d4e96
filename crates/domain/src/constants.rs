//! Session constants
//!
//! Centralized storage keys, endpoint paths and policy defaults used by the
//! session client.

// Persisted key/value layout
pub const ACCESS_TOKEN_KEY: &str = "_at";
pub const USER_KEY: &str = "user";

// Backend endpoints
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";
pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGN_UP_PATH: &str = "/auth/sign-up";
pub const SIGN_OUT_PATH: &str = "/auth/sign-out";
pub const ME_PATH: &str = "/auth/me";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const VERIFY_OTP_PATH: &str = "/auth/forgot-password/verify";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

// Policy defaults
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 900;
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;
/// Upper bound applied to a server-declared `expires_in` (30 days)
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 2_592_000;
pub const DEFAULT_SESSION_STORE: &str = "hotelops-session.json";

// User-facing fallback messages
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error.";
