//! Authentication endpoints
//!
//! Login persists the issued token and arms the proactive refresh exactly
//! once; logout tears the local session down whatever the server says.
//! Credential endpoints are sent anonymously, so a wrong password surfaces
//! as the server's 401 message instead of starting a token refresh.

use std::sync::Arc;

use chrono::Utc;
use hotelops_core::{GrantLifetime, StoredToken, TokenStore, UserStore};
use hotelops_domain::constants::{
    FORGOT_PASSWORD_PATH, LOGIN_PATH, ME_PATH, RESET_PASSWORD_PATH, SIGN_OUT_PATH, SIGN_UP_PATH,
    VERIFY_OTP_PATH,
};
use hotelops_domain::{
    ForgotPasswordResponse, LoginOutcome, LoginRequest, RegisterRequest, ResetPasswordRequest,
    TokenGrant, User, VerifyOtpRequest, VerifyOtpResponse,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestOptions;
use crate::session::RefreshCoordinator;

/// Login, profile and OTP password-reset flows
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn UserStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthApi {
    pub fn new(
        client: ApiClient,
        tokens: Arc<dyn TokenStore>,
        users: Arc<dyn UserStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self { client, tokens, users, coordinator }
    }

    /// Sign in and start the session.
    ///
    /// # Errors
    /// Returns the normalized server error for rejected credentials, or
    /// `ApiError::Decode` when the response carries no access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let request = LoginRequest { username: username.to_string(), password: password.to_string() };
        let body: Value = self
            .client
            .request(Method::POST, LOGIN_PATH, RequestOptions::new().json(&request)?.anonymous())
            .await?;

        let grant = TokenGrant::from_body(&body)
            .ok_or_else(|| ApiError::Decode("Login response did not contain an access token".into()))?;
        let user = [body.get("data").and_then(|data| data.get("user")), body.get("user")]
            .into_iter()
            .flatten()
            .find_map(|candidate| serde_json::from_value::<User>(candidate.clone()).ok());

        let policy = self.coordinator.policy();
        self.tokens
            .set(StoredToken::from_grant(&grant, Utc::now(), policy.token_lifetime))
            .await?;
        self.coordinator.scheduler().schedule(grant.lifetime(policy.token_lifetime));

        if let Some(user) = &user {
            self.users.set(user.clone()).await?;
        }

        info!(username, "signed in");
        Ok(LoginOutcome { grant, user })
    }

    /// Create an account; returns the server's response body.
    ///
    /// # Errors
    /// Returns the normalized server error when registration is rejected.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        self.client
            .request(Method::POST, SIGN_UP_PATH, RequestOptions::new().json(&request)?.anonymous())
            .await
    }

    /// Fetch the signed-in profile and refresh the stored copy.
    ///
    /// # Errors
    /// Propagates pipeline errors; `ApiError::Decode` if no profile is found
    /// in the response.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        let body: Value = self.client.get(ME_PATH).await?;
        let user: User = payload(&body, "user profile")?;
        self.users.set(user.clone()).await?;
        Ok(user)
    }

    /// Request an OTP by email; returns the token identifying the attempt.
    ///
    /// # Errors
    /// Returns the normalized server error for unknown addresses.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let options = RequestOptions::new().body(json!({ "email": email })).anonymous();
        let body: Value = self.client.request(Method::POST, FORGOT_PASSWORD_PATH, options).await?;

        let response: ForgotPasswordResponse = payload(&body, "forgot_password_token")?;
        Ok(response.forgot_password_token)
    }

    /// Exchange the emailed OTP for a password-reset token.
    ///
    /// # Errors
    /// Returns the normalized server error for a wrong or expired OTP.
    #[instrument(skip(self, request))]
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<String, ApiError> {
        let options = RequestOptions::new().json(request)?.anonymous();
        let body: Value = self.client.request(Method::POST, VERIFY_OTP_PATH, options).await?;

        let response: VerifyOtpResponse = payload(&body, "reset_password_token")?;
        Ok(response.reset_password_token)
    }

    /// Set a new password; returns the server's confirmation message.
    ///
    /// # Errors
    /// Returns the normalized server error when the reset token is invalid.
    #[instrument(skip(self, request))]
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<Option<String>, ApiError> {
        let options = RequestOptions::new().json(request)?.anonymous();
        let body: Value = self.client.request(Method::POST, RESET_PASSWORD_PATH, options).await?;

        Ok(body.get("message").and_then(Value::as_str).map(str::to_string))
    }

    /// Sign out and tear the local session down.
    ///
    /// The token, the proactive timer and the stored profile are cleared
    /// even when the sign-out call fails; that failure is returned after.
    ///
    /// # Errors
    /// Returns the sign-out error, or `ApiError::Storage` if local state
    /// could not be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let outcome = self.client.request::<Value>(Method::POST, SIGN_OUT_PATH, RequestOptions::new()).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "sign-out call failed; clearing local session anyway");
        }

        let teardown = self.teardown().await;
        outcome?;
        teardown?;

        info!("signed out");
        Ok(())
    }

    /// Clear the stored token, timer and profile
    ///
    /// # Errors
    /// Returns `ApiError::Storage` when a store cannot be cleared; the timer
    /// is cleared regardless.
    pub async fn teardown(&self) -> Result<(), ApiError> {
        self.coordinator.scheduler().clear();
        let tokens = self.tokens.clear().await;
        let users = self.users.clear().await;
        tokens?;
        users?;
        Ok(())
    }
}

/// Decode `T` from the `data` envelope, falling back to the top level
fn payload<T: DeserializeOwned>(body: &Value, what: &str) -> Result<T, ApiError> {
    [body.get("data"), Some(body)]
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_value(candidate.clone()).ok())
        .ok_or_else(|| ApiError::Decode(format!("Response did not contain a {what}")))
}
