//! Request descriptors
//!
//! A [`RequestDescriptor`] is everything needed to (re)issue one call. The
//! pipeline keeps it across the 401 → refresh → replay cycle and uses its
//! `retried` flag to guarantee at most one replay.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::ApiError;

/// Per-call options supplied by collaborators
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Option<Value>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Send without the stored bearer token and pass 401s straight through
    pub anonymous: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` when `body` cannot be represented
    /// as JSON.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {e}")))?;
        Ok(self.body(value))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// One logical call, possibly issued twice
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
    retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>, options: RequestOptions) -> Self {
        Self { method, path: path.into(), options, retried: false }
    }

    /// Whether this call has already been replayed after a refresh
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
