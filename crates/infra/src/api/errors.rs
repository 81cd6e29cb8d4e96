//! API-specific error types
//!
//! Every failure surfaced by the request pipeline is one [`ApiError`], so
//! callers branch on a single shape instead of inspecting raw responses.

use hotelops_domain::constants::{
    NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE, UNEXPECTED_ERROR_MESSAGE,
};
use hotelops_domain::HotelOpsError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Session can no longer be used; the user must log in again
    Authentication,
    /// 5xx responses
    Server,
    /// 4xx responses (other than 401) and requests that could not be built
    Client,
    /// No response at all (timeout, DNS, connection refused)
    Network,
    /// Misconfiguration of the client itself
    Config,
    /// Local session persistence failed
    Storage,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    SessionExpired(String),

    /// Non-2xx response other than an intercepted 401
    #[error("{message}")]
    Server { message: String, status: u16, raw: Option<Value> },

    #[error("Refresh response did not contain an access token")]
    MalformedRefreshResponse,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn network() -> Self {
        Self::Network(NETWORK_ERROR_MESSAGE.to_string())
    }

    pub fn session_expired() -> Self {
        Self::SessionExpired(SESSION_EXPIRED_MESSAGE.to_string())
    }

    /// Normalize an error response body.
    ///
    /// The message comes from the body's `message` field (a string, or a list
    /// of validation messages joined with `, `); anything else falls back to
    /// a generic message. Non-JSON bodies are kept as a raw string.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let raw = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            )
        };

        let message = raw
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(|message| match message {
                Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
                Value::Array(items) => {
                    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    (!parts.is_empty()).then(|| parts.join(", "))
                }
                _ => None,
            })
            .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string());

        Self::Server { message, status: status.as_u16(), raw }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Network(_) => ApiErrorCategory::Network,
            Self::SessionExpired(_) | Self::MalformedRefreshResponse => {
                ApiErrorCategory::Authentication
            }
            Self::Server { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Server { .. } | Self::Decode(_) | Self::InvalidRequest(_) => {
                ApiErrorCategory::Client
            }
            Self::Config(_) => ApiErrorCategory::Config,
            Self::Storage(_) => ApiErrorCategory::Storage,
        }
    }

    /// Whether the caller should send the user back to the login screen
    pub fn is_session_expired(&self) -> bool {
        self.category() == ApiErrorCategory::Authentication
    }

    /// HTTP status of a server error response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HotelOpsError> for ApiError {
    fn from(err: HotelOpsError) -> Self {
        match err {
            HotelOpsError::Network(_) => Self::network(),
            HotelOpsError::Config(message) => Self::Config(message),
            HotelOpsError::Storage(message) => Self::Storage(message),
            HotelOpsError::InvalidInput(message) | HotelOpsError::Internal(message) => {
                Self::InvalidRequest(message)
            }
        }
    }
}
