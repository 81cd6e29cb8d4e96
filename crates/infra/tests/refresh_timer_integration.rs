//! Integration tests for the proactive refresh timer
//!
//! Time is paused, so timers elapse deterministically and the refresh
//! endpoint is replaced by an in-process transport.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hotelops_core::{StoredToken, TokenStore};
use hotelops_domain::TokenGrant;
use hotelops_infra::session::RefreshTransport;
use hotelops_infra::{ApiError, MemoryTokenStore, MemoryUserStore, Session};

#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl RefreshTransport for CountingTransport {
    async fn refresh(&self) -> Result<TokenGrant, ApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant { access_token: format!("T{}", n + 1), expires_in: Some(900) })
    }
}

fn session_with(token: Option<StoredToken>, transport: Arc<CountingTransport>) -> (Session, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
    let session = Session::builder(support::config_for("http://127.0.0.1:9", 1_000))
        .token_store(tokens.clone())
        .user_store(Arc::new(MemoryUserStore::new()))
        .refresh_transport(transport)
        .build()
        .unwrap();
    (session, tokens)
}

#[tokio::test(start_paused = true)]
async fn repeated_bootstrap_keeps_a_single_timer() {
    let transport = Arc::new(CountingTransport::default());
    let (session, tokens) = session_with(Some(StoredToken::new("T1", None)), transport.clone());

    for _ in 0..3 {
        assert!(session.bootstrap().await.unwrap());
    }
    assert!(session.scheduler().is_armed());

    // default lifetime 900 s, margin 60 s
    tokio::time::sleep(Duration::from_secs(839)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.get().await.unwrap().unwrap().value, "T2");

    // re-armed for the new token
    assert!(session.scheduler().is_armed());
}

#[tokio::test(start_paused = true)]
async fn two_schedules_fire_exactly_once() {
    let transport = Arc::new(CountingTransport::default());
    let (session, _tokens) = session_with(None, transport.clone());

    session.scheduler().schedule(Duration::from_secs(120));
    session.scheduler().schedule(Duration::from_secs(300));

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(141)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn proactive_refresh_chains_across_expiries() {
    let transport = Arc::new(CountingTransport::default());
    let (session, tokens) = session_with(Some(StoredToken::new("T1", None)), transport.clone());
    session.bootstrap().await.unwrap();

    tokio::time::sleep(Duration::from_secs(841 * 3)).await;

    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    assert_eq!(tokens.get().await.unwrap().unwrap().value, "T4");
}

#[tokio::test(start_paused = true)]
async fn bootstrap_without_token_clears_pending_timer() {
    let transport = Arc::new(CountingTransport::default());
    let (session, _tokens) = session_with(None, transport.clone());
    session.scheduler().schedule(Duration::from_secs(600));

    assert!(!session.bootstrap().await.unwrap());
    assert!(!session.scheduler().is_armed());

    tokio::time::sleep(Duration::from_secs(3_600)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn expired_token_refreshes_after_minimum_delay_on_bootstrap() {
    let transport = Arc::new(CountingTransport::default());
    let expired = StoredToken::new("T1", Some(chrono::Utc::now() - chrono::Duration::minutes(5)));
    let (session, tokens) = session_with(Some(expired), transport.clone());

    session.bootstrap().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.get().await.unwrap().unwrap().value, "T2");
}

#[tokio::test(start_paused = true)]
async fn server_expiry_inside_margin_refreshes_at_a_bounded_rate() {
    struct ShortLived(AtomicUsize);

    #[async_trait]
    impl RefreshTransport for ShortLived {
        async fn refresh(&self) -> Result<TokenGrant, ApiError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(TokenGrant { access_token: "T2".into(), expires_in: Some(30) })
        }
    }

    let transport = Arc::new(ShortLived(AtomicUsize::new(0)));
    let tokens = Arc::new(MemoryTokenStore::with_token(StoredToken::new("T1", None)));
    let session = Session::builder(support::config_for("http://127.0.0.1:9", 1_000))
        .token_store(tokens)
        .user_store(Arc::new(MemoryUserStore::new()))
        .refresh_transport(transport.clone())
        .build()
        .unwrap();

    session.coordinator().acquire().await.unwrap();
    tokio::time::sleep(Duration::from_secs(55)).await;

    // one reactive refresh, then one every 15 s
    assert_eq!(transport.0.load(Ordering::SeqCst), 4);
}
