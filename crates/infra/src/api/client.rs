//! Authenticated request pipeline
//!
//! Every collaborator call goes through [`ApiClient::request`]:
//! - the stored access token is attached as `Authorization: Bearer`
//! - a 401 parks the call on the [`RefreshCoordinator`] and replays it once
//!   with the new token
//! - failures come back as a single [`ApiError`] shape

use std::sync::Arc;

use hotelops_core::TokenStore;
use hotelops_domain::constants::UNAUTHORIZED_MESSAGE;
use hotelops_domain::HotelOpsError;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::errors::ApiError;
use super::query;
use super::request::{RequestDescriptor, RequestOptions};
use crate::http::HttpClient;
use crate::session::RefreshCoordinator;

/// Request pipeline shared by every screen
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a pipeline over `http` rooted at `base_url`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if `base_url` is not an absolute URL.
    pub fn new(
        http: HttpClient,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            coordinator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one call and decode its JSON body.
    ///
    /// 204/205 responses and empty bodies decode from `null`, so `()` and
    /// `Option<T>` work for endpoints without content.
    ///
    /// # Errors
    /// - `ApiError::Network` when no response arrived (timeout, refused)
    /// - `ApiError::SessionExpired` when a 401 survived one refresh or the
    ///   refresh itself failed
    /// - `ApiError::Server` for any other non-2xx response
    /// - `ApiError::Decode` when a 2xx body does not match `T`
    #[instrument(skip(self, options), fields(method = %method, path = %path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let mut descriptor = RequestDescriptor::new(method, path, options);
        let response = self.send(&mut descriptor).await?;
        Self::decode(response).await
    }

    /// Dispatch a descriptor, handling the 401 → refresh → replay cycle.
    ///
    /// Returns the first non-401 response if it is a success.
    ///
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn send(&self, descriptor: &mut RequestDescriptor) -> Result<Response, ApiError> {
        let mut token = if descriptor.options.anonymous {
            None
        } else {
            self.tokens.get().await?.map(|stored| stored.value)
        };

        loop {
            let response = self.dispatch(descriptor, token.as_deref()).await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED || descriptor.options.anonymous {
                return Self::ensure_success(response).await;
            }

            if descriptor.is_retried() {
                warn!(path = %descriptor.path, "request unauthorized after refresh");
                self.coordinator.scheduler().clear();
                return Err(ApiError::SessionExpired(UNAUTHORIZED_MESSAGE.to_string()));
            }

            descriptor.mark_retried();
            debug!(path = %descriptor.path, "access token rejected; refreshing");
            token = Some(self.coordinator.acquire().await?);
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    /// GET with a filter object flattened into the query string
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Value,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestOptions::new().query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::new().json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, RequestOptions::new().json(body)?).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, RequestOptions::new().json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, RequestOptions::new()).await
    }

    fn url_for(&self, descriptor: &RequestDescriptor) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base_url, descriptor.path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid path '{}': {e}", descriptor.path)))?;

        if let Some(filters) = &descriptor.options.query {
            let pairs = query::flatten(filters)?;
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        Ok(url)
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(descriptor)?;

        // Authorization only ever comes from the token store
        let mut headers = descriptor.options.headers.clone();
        headers.remove(AUTHORIZATION);

        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ApiError::InvalidRequest("Stored access token is not a valid header".into())
            })?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let mut request = self.http.request(descriptor.method.clone(), url);

        if let Some(body) = &descriptor.options.body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            request = request.json(body);
        }

        let request = request.headers(headers);

        self.http.send(request).await.map_err(|err| {
            if let HotelOpsError::Network(detail) = &err {
                debug!(path = %descriptor.path, %detail, "no response from backend");
            }
            ApiError::from(err)
        })
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.map_err(|_| ApiError::network())?;
        let err = ApiError::from_response(status, &body);
        debug!(%status, message = %err, "backend returned an error");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Decode(format!(
                    "No content response ({}), but response type cannot be deserialized from empty body",
                    status.as_u16()
                ))
            });
        }

        let body = response.bytes().await.map_err(|_| ApiError::network())?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(Value::Null)
                .map_err(|e| ApiError::Decode(format!("Empty response body: {e}")));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish()
    }
}
