//! Shared fixtures for the session integration tests
#![allow(dead_code)]

use std::sync::Arc;

use hotelops_core::StoredToken;
use hotelops_domain::{ApiConfig, Config, SessionConfig};
use hotelops_infra::{MemoryTokenStore, MemoryUserStore, Session};
use wiremock::{MockServer, Request};

/// Mock backend plus a session wired to it with in-memory stores
pub struct Harness {
    pub server: MockServer,
    pub session: Session,
    pub tokens: Arc<MemoryTokenStore>,
    pub users: Arc<MemoryUserStore>,
}

impl Harness {
    pub async fn start(token: Option<&str>) -> Self {
        Self::with_timeout(token, 2_000).await
    }

    pub async fn with_timeout(token: Option<&str>, timeout_ms: u64) -> Self {
        let server = MockServer::start().await;
        let tokens = Arc::new(match token {
            Some(value) => MemoryTokenStore::with_token(StoredToken::new(value, None)),
            None => MemoryTokenStore::new(),
        });
        let users = Arc::new(MemoryUserStore::new());

        let session = Session::builder(config_for(&server.uri(), timeout_ms))
            .token_store(tokens.clone())
            .user_store(users.clone())
            .build()
            .expect("session should build");

        Self { server, session, tokens, users }
    }

    /// Requests the backend received for `path`
    pub async fn received(&self, path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }
}

pub fn config_for(base_url: &str, timeout_ms: u64) -> Config {
    Config {
        api: ApiConfig { base_url: base_url.to_string(), timeout_ms },
        session: SessionConfig::default(),
        ..Config::default()
    }
}

/// `Authorization` header of a recorded request
pub fn bearer_of(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
