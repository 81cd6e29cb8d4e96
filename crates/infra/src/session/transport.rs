//! Refresh endpoint transport
//!
//! The refresh call goes through its own client: it must not pass through
//! the pipeline's 401 handling, and it authenticates with the http-only
//! refresh cookie from the shared jar rather than a bearer token.

use async_trait::async_trait;
use hotelops_domain::constants::REFRESH_TOKEN_PATH;
use hotelops_domain::TokenGrant;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::api::ApiError;
use crate::http::HttpClient;

/// Issues one refresh call
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchange the refresh credential for a new access token
    async fn refresh(&self) -> Result<TokenGrant, ApiError>;
}

/// `POST /auth/refresh-token` over HTTP
#[derive(Clone)]
pub struct HttpRefreshTransport {
    http: HttpClient,
    url: String,
}

impl HttpRefreshTransport {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        let url = format!("{}{}", base_url.trim_end_matches('/'), REFRESH_TOKEN_PATH);
        Self { http, url }
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self) -> Result<TokenGrant, ApiError> {
        let request = self.http.request(Method::POST, &self.url);
        let response = self.http.send(request).await.map_err(ApiError::from)?;

        let status = response.status();
        let body = response.bytes().await.map_err(|_| ApiError::network())?;

        if !status.is_success() {
            debug!(%status, "refresh endpoint rejected the session");
            return Err(ApiError::from_response(status, &body));
        }

        let payload: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?
        };

        TokenGrant::from_body(&payload).ok_or(ApiError::MalformedRefreshResponse)
    }
}
