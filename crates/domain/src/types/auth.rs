//! Authentication payloads
//!
//! Request bodies for the login and OTP password-reset endpoints, and the
//! token grant carried by login and refresh responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::User;

/// Access token issued by login or refresh
///
/// The backend sends `{ "accessToken": "...", "expires_in": 900 }`; only
/// `accessToken` is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    #[serde(rename = "accessToken", alias = "access_token")]
    pub access_token: String,
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<u64>,
}

impl TokenGrant {
    /// Extract a grant from a response body.
    ///
    /// Looks at the top level first, then inside the `data` envelope. Returns
    /// `None` when no non-empty `accessToken` is present.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        [Some(body), body.get("data")]
            .into_iter()
            .flatten()
            .find_map(|candidate| serde_json::from_value::<Self>(candidate.clone()).ok())
            .filter(|grant| !grant.access_token.trim().is_empty())
    }
}

/// `POST /auth/login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/sign-up` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub grant: TokenGrant,
    pub user: Option<User>,
}

/// `data` of `POST /auth/forgot-password`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub forgot_password_token: String,
}

/// `POST /auth/forgot-password/verify` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub forgot_password_token: String,
    pub otp: String,
}

/// `data` of `POST /auth/forgot-password/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub reset_password_token: String,
}

/// `POST /auth/reset-password` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub reset_password_token: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn grant_from_top_level_body() {
        let grant = TokenGrant::from_body(&json!({ "accessToken": "T2", "expires_in": 600 }))
            .unwrap();

        assert_eq!(grant.access_token, "T2");
        assert_eq!(grant.expires_in, Some(600));
    }

    #[test]
    fn grant_from_data_envelope() {
        let body = json!({ "data": { "accessToken": "T3", "user": { "id": 1 } }, "message": "ok" });
        let grant = TokenGrant::from_body(&body).unwrap();

        assert_eq!(grant.access_token, "T3");
        assert_eq!(grant.expires_in, None);
    }

    #[test]
    fn grant_missing_or_empty_token_is_none() {
        assert!(TokenGrant::from_body(&json!({ "expires_in": 600 })).is_none());
        assert!(TokenGrant::from_body(&json!({ "accessToken": "  " })).is_none());
        assert!(TokenGrant::from_body(&json!(null)).is_none());
    }
}
