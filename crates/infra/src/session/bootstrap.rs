//! Startup alignment of the refresh timer with persisted state

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hotelops_core::TokenStore;
use tracing::{debug, info, instrument};

use super::scheduler::RefreshScheduler;
use crate::api::ApiError;

/// Arms or clears the proactive timer from whatever token survived a restart
#[derive(Clone)]
pub struct SessionBootstrap {
    tokens: Arc<dyn TokenStore>,
    scheduler: Arc<RefreshScheduler>,
    token_lifetime: Duration,
}

impl SessionBootstrap {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        scheduler: Arc<RefreshScheduler>,
        token_lifetime: Duration,
    ) -> Self {
        Self { tokens, scheduler, token_lifetime }
    }

    /// Inspect the stored token and (re)arm or clear the timer.
    ///
    /// Safe to call repeatedly: scheduling replaces the previous timer.
    /// Returns whether a token is present.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the token store cannot be read.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<bool, ApiError> {
        match self.tokens.get().await? {
            Some(token) => {
                let remaining = token.remaining(Utc::now()).unwrap_or(self.token_lifetime);
                self.scheduler.schedule(remaining);
                info!(remaining_secs = remaining.as_secs(), "restored session");
                Ok(true)
            }
            None => {
                self.scheduler.clear();
                debug!("no stored session");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use async_trait::async_trait;
    use hotelops_core::StoredToken;

    use super::*;
    use crate::session::scheduler::ProactiveRefresh;
    use crate::storage::MemoryTokenStore;

    struct Noop;

    #[async_trait]
    impl ProactiveRefresh for Noop {
        async fn refresh(&self) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    fn scheduler(margin_secs: u64) -> Arc<RefreshScheduler> {
        Arc::new(RefreshScheduler::new(Weak::<Noop>::new(), Duration::from_secs(margin_secs)))
    }

    #[tokio::test(start_paused = true)]
    async fn stored_token_arms_timer_with_remaining_lifetime() {
        let expires_at = Utc::now() + chrono::Duration::seconds(300);
        let tokens = Arc::new(MemoryTokenStore::with_token(StoredToken::new("T1", Some(expires_at))));
        let scheduler = scheduler(60);
        let bootstrap = SessionBootstrap::new(tokens, Arc::clone(&scheduler), Duration::from_secs(900));

        assert!(bootstrap.run().await.unwrap());

        let deadline = scheduler.deadline().unwrap();
        let delay = deadline - tokio::time::Instant::now();
        assert!(delay <= Duration::from_secs(240));
        assert!(delay >= Duration::from_secs(235));
    }

    #[tokio::test(start_paused = true)]
    async fn legacy_token_uses_full_lifetime() {
        let tokens = Arc::new(MemoryTokenStore::with_token(StoredToken::new("T1", None)));
        let scheduler = scheduler(60);
        let bootstrap = SessionBootstrap::new(tokens, Arc::clone(&scheduler), Duration::from_secs(900));

        bootstrap.run().await.unwrap();

        let delay = scheduler.deadline().unwrap() - tokio::time::Instant::now();
        assert_eq!(delay, Duration::from_secs(840));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_clears_timer() {
        let scheduler = scheduler(60);
        scheduler.schedule(Duration::from_secs(600));

        let bootstrap = SessionBootstrap::new(
            Arc::new(MemoryTokenStore::new()),
            Arc::clone(&scheduler),
            Duration::from_secs(900),
        );

        assert!(!bootstrap.run().await.unwrap());
        assert!(!scheduler.is_armed());
    }
}
