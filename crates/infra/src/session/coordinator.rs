//! Single-flight token refresh
//!
//! However many requests hit a 401 at once, only one refresh call is in
//! flight. Every caller parks a oneshot waiter; when the refresh settles the
//! whole queue is drained in enqueue order with the same outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hotelops_core::{GrantLifetime, StoredToken, TokenStore};
use hotelops_domain::SessionConfig;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use super::scheduler::{ProactiveRefresh, RefreshScheduler};
use super::transport::RefreshTransport;
use crate::api::ApiError;

type Waiter = oneshot::Sender<Result<String, ApiError>>;

/// Token lifetime policy shared by the coordinator and the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Assumed lifetime when the server omits `expires_in`
    pub token_lifetime: Duration,
    /// How long before expiry the proactive refresh fires
    pub refresh_margin: Duration,
}

impl From<&SessionConfig> for RefreshPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self { token_lifetime: config.token_lifetime(), refresh_margin: config.refresh_margin() }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<Waiter>,
}

struct Shared {
    state: Mutex<RefreshState>,
    transport: Arc<dyn RefreshTransport>,
    tokens: Arc<dyn TokenStore>,
    scheduler: Arc<RefreshScheduler>,
    policy: RefreshPolicy,
    refresh_calls: AtomicUsize,
}

/// Owner of the refresh state machine (`idle` ⇄ `refreshing`)
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    /// Build a coordinator together with the scheduler it re-arms.
    ///
    /// The scheduler fires back into this coordinator through a weak handle.
    pub fn new(
        transport: Arc<dyn RefreshTransport>,
        tokens: Arc<dyn TokenStore>,
        policy: RefreshPolicy,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let target: Weak<dyn ProactiveRefresh> = weak.clone();
            let scheduler = Arc::new(RefreshScheduler::new(target, policy.refresh_margin));

            Self {
                shared: Arc::new(Shared {
                    state: Mutex::new(RefreshState::default()),
                    transport,
                    tokens,
                    scheduler,
                    policy,
                    refresh_calls: AtomicUsize::new(0),
                }),
            }
        })
    }

    /// Wait for a fresh access token.
    ///
    /// Joins the in-flight refresh if there is one, otherwise starts it. The
    /// refresh runs on its own task, so dropping this future never strands
    /// the other waiters.
    ///
    /// # Errors
    /// Returns `ApiError::SessionExpired` when the refresh fails for any
    /// reason.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<String, ApiError> {
        let (tx, rx) = oneshot::channel();

        let start = {
            let mut state = self.shared.state.lock();
            state.waiters.push(tx);
            let start = !state.refreshing;
            state.refreshing = true;
            start
        };

        if start {
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move { shared.run_refresh().await });
        } else {
            debug!("refresh already in flight; waiting");
        }

        rx.await.unwrap_or_else(|_| Err(ApiError::session_expired()))
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.shared.scheduler
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.shared.policy
    }

    /// Whether a refresh call is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.shared.state.lock().refreshing
    }

    /// Number of refresh calls issued so far
    pub fn refresh_calls(&self) -> usize {
        self.shared.refresh_calls.load(Ordering::SeqCst)
    }
}

impl Shared {
    async fn run_refresh(&self) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let guard = SettleGuard { shared: Some(self) };

        let outcome = match self.refresh_and_persist().await {
            Ok((token, expires_in)) => {
                self.scheduler.schedule(expires_in);
                Ok(token)
            }
            Err(err) => {
                self.scheduler.clear();
                Err(err)
            }
        };

        guard.finish(outcome);
    }

    async fn refresh_and_persist(&self) -> Result<(String, Duration), ApiError> {
        let grant = self.transport.refresh().await?;
        let expires_in = grant.lifetime(self.policy.token_lifetime);

        let stored = StoredToken::from_grant(&grant, Utc::now(), self.policy.token_lifetime);
        self.tokens.set(stored).await?;

        Ok((grant.access_token, expires_in))
    }

    /// Return to `idle` and hand back the drained queue
    fn settle(&self) -> Vec<Waiter> {
        let mut state = self.state.lock();
        state.refreshing = false;
        std::mem::take(&mut state.waiters)
    }

    fn fan_out(&self, outcome: Result<String, ApiError>) {
        let waiters = self.settle();
        match outcome {
            Ok(token) => {
                info!(waiters = waiters.len(), "access token refreshed");
                for waiter in waiters {
                    let _ = waiter.send(Ok(token.clone()));
                }
            }
            Err(err) => {
                warn!(error = %err, waiters = waiters.len(), "token refresh failed");
                for waiter in waiters {
                    let _ = waiter.send(Err(ApiError::session_expired()));
                }
            }
        }
    }
}

/// Settles the cycle exactly once. If the refresh task unwinds or is
/// dropped first, the queue is rejected so no caller waits forever.
struct SettleGuard<'a> {
    shared: Option<&'a Shared>,
}

impl SettleGuard<'_> {
    fn finish(mut self, outcome: Result<String, ApiError>) {
        if let Some(shared) = self.shared.take() {
            shared.fan_out(outcome);
        }
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            warn!("refresh task aborted before settling");
            shared.scheduler.clear();
            shared.fan_out(Err(ApiError::session_expired()));
        }
    }
}

#[async_trait]
impl ProactiveRefresh for RefreshCoordinator {
    async fn refresh(&self) -> Result<String, ApiError> {
        self.acquire().await
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("refresh_calls", &self.refresh_calls())
            .field("policy", &self.shared.policy)
            .finish()
    }
}
