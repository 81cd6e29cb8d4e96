//! Session layer
//!
//! - [`RefreshCoordinator`]: single-flight refresh with waiter fan-out
//! - [`RefreshScheduler`]: one-shot proactive refresh timer
//! - [`SessionBootstrap`]: aligns the timer with persisted state on start
//! - [`Session`]: wires stores, refresh machinery and the request pipeline
//!   from a [`Config`]

pub mod bootstrap;
pub mod coordinator;
pub mod scheduler;
pub mod transport;

use std::sync::Arc;

use hotelops_core::{SessionSnapshot, TokenStore, UserStore};
use hotelops_domain::Config;
use reqwest::cookie::Jar;

pub use bootstrap::SessionBootstrap;
pub use coordinator::{RefreshCoordinator, RefreshPolicy};
pub use scheduler::{ProactiveRefresh, RefreshScheduler};
pub use transport::{HttpRefreshTransport, RefreshTransport};

use crate::api::{ApiClient, ApiError, AuthApi};
use crate::http::HttpClient;
use crate::storage::{FileKeyValueStore, PersistedTokenStore, PersistedUserStore};

const USER_AGENT: &str = concat!("hotelops-session/", env!("CARGO_PKG_VERSION"));

/// A signed-in (or signed-out) console session
pub struct Session {
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn UserStore>,
    coordinator: Arc<RefreshCoordinator>,
    client: ApiClient,
    auth: AuthApi,
    bootstrap: SessionBootstrap,
}

impl Session {
    /// Build a session persisted at `config.session.store_path`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` for an invalid base URL or HTTP setup.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::builder(config.clone()).build()
    }

    pub fn builder(config: Config) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    /// Arm or clear the proactive refresh from the persisted token.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the token cannot be read.
    pub async fn bootstrap(&self) -> Result<bool, ApiError> {
        self.bootstrap.run().await
    }

    /// Whether a non-empty access token is stored
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the token cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.tokens.get().await?.is_some())
    }

    /// Current session state for route guards and profile views
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the stores cannot be read.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ApiError> {
        let token = self.tokens.get().await?;
        let user = self.users.get().await?;
        Ok(SessionSnapshot::new(token.as_ref(), user))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        self.coordinator.scheduler()
    }
}

/// Builder for [`Session`]; any part left unset gets its production default.
pub struct SessionBuilder {
    config: Config,
    tokens: Option<Arc<dyn TokenStore>>,
    users: Option<Arc<dyn UserStore>>,
    transport: Option<Arc<dyn RefreshTransport>>,
    cookie_jar: Option<Arc<Jar>>,
}

impl SessionBuilder {
    fn new(config: Config) -> Self {
        Self { config, tokens: None, users: None, transport: None, cookie_jar: None }
    }

    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn refresh_transport(mut self, transport: Arc<dyn RefreshTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Cookie jar holding the refresh cookie, shared by both clients
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Build the session
    ///
    /// # Errors
    /// Returns `ApiError::Config` for an invalid base URL or HTTP setup.
    pub fn build(self) -> Result<Session, ApiError> {
        let config = self.config;
        let base_url = config.api.base_url.as_str();
        let jar = self.cookie_jar.unwrap_or_default();

        let http = Self::http_client(&config, &jar)?;

        let (tokens, users) = match (self.tokens, self.users) {
            (Some(tokens), Some(users)) => (tokens, users),
            (tokens, users) => {
                let kv = Arc::new(FileKeyValueStore::new(&config.session.store_path));
                let tokens = tokens.unwrap_or_else(|| {
                    Arc::new(PersistedTokenStore::new(Arc::clone(&kv))) as Arc<dyn TokenStore>
                });
                let users = users.unwrap_or_else(|| {
                    Arc::new(PersistedUserStore::new(kv)) as Arc<dyn UserStore>
                });
                (tokens, users)
            }
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpRefreshTransport::new(Self::http_client(&config, &jar)?, base_url)),
        };

        let policy = RefreshPolicy::from(&config.session);
        let coordinator = RefreshCoordinator::new(transport, Arc::clone(&tokens), policy);
        let client = ApiClient::new(http, base_url, Arc::clone(&tokens), Arc::clone(&coordinator))?;
        let auth = AuthApi::new(
            client.clone(),
            Arc::clone(&tokens),
            Arc::clone(&users),
            Arc::clone(&coordinator),
        );
        let bootstrap = SessionBootstrap::new(
            Arc::clone(&tokens),
            Arc::clone(coordinator.scheduler()),
            policy.token_lifetime,
        );

        Ok(Session { tokens, users, coordinator, client, auth, bootstrap })
    }

    fn http_client(config: &Config, jar: &Arc<Jar>) -> Result<HttpClient, ApiError> {
        HttpClient::builder()
            .timeout(config.api.timeout())
            .user_agent(USER_AGENT)
            .cookie_jar(Arc::clone(jar))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use hotelops_core::StoredToken;
    use hotelops_domain::ApiConfig;
    use tempfile::TempDir;

    use super::*;
    use crate::storage::{MemoryTokenStore, MemoryUserStore};

    fn config(dir: &TempDir) -> Config {
        let mut config = Config {
            api: ApiConfig { base_url: "http://127.0.0.1:9".into(), ..ApiConfig::default() },
            ..Config::default()
        };
        config.session.store_path = dir.path().join("session.json").display().to_string();
        config
    }

    #[tokio::test]
    async fn fresh_session_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let session = Session::from_config(&config(&dir)).unwrap();

        assert!(!session.bootstrap().await.unwrap());
        assert!(!session.is_authenticated().await.unwrap());
        assert!(!session.scheduler().is_armed());

        let snapshot = session.snapshot().await.unwrap();
        assert!(!snapshot.authenticated);
        assert!(snapshot.user.is_none());
    }

    #[tokio::test]
    async fn injected_stores_are_used() {
        let dir = TempDir::new().unwrap();
        let tokens = Arc::new(MemoryTokenStore::with_token(StoredToken::new("T1", None)));
        let session = Session::builder(config(&dir))
            .token_store(tokens)
            .user_store(Arc::new(MemoryUserStore::new()))
            .build()
            .unwrap();

        assert!(session.bootstrap().await.unwrap());
        assert!(session.is_authenticated().await.unwrap());
        assert!(session.scheduler().is_armed());
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.api.base_url = "api.instay.test".into();

        assert!(matches!(Session::from_config(&config), Err(ApiError::Config(_))));
    }
}
