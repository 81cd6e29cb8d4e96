//! Proactive refresh scheduler
//!
//! Holds the single one-shot timer that refreshes the access token shortly
//! before it expires. Scheduling replaces any pending timer; clearing is
//! idempotent.

use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::ApiError;

/// Shortest delay the timer is ever armed with
pub const MIN_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Target fired by the scheduler when the timer elapses
#[async_trait]
pub trait ProactiveRefresh: Send + Sync {
    /// Obtain a fresh access token
    async fn refresh(&self) -> Result<String, ApiError>;
}

struct TimerSlot {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    deadline: Option<Instant>,
}

/// Process-wide one-shot refresh timer
pub struct RefreshScheduler {
    target: Weak<dyn ProactiveRefresh>,
    margin: Duration,
    slot: Mutex<Option<TimerSlot>>,
}

impl RefreshScheduler {
    /// Create a scheduler that fires `margin` before each expiry.
    ///
    /// The target is held weakly; once it is dropped, elapsed timers do
    /// nothing.
    pub fn new(target: Weak<dyn ProactiveRefresh>, margin: Duration) -> Self {
        Self { target, margin, slot: Mutex::new(None) }
    }

    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// Arm the timer for a token that expires in `expires_in`.
    ///
    /// Fires at `expires_in - margin`. A token that expires within the
    /// margin is refreshed halfway through its remaining lifetime, never
    /// sooner than [`MIN_REFRESH_DELAY`]. Any previously armed timer is
    /// cancelled. The refresh outcome is logged and otherwise ignored.
    pub fn schedule(&self, expires_in: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; proactive refresh not scheduled");
            return;
        };

        let delay = self.delay_for(expires_in);
        let cancel = CancellationToken::new();
        let target = Weak::clone(&self.target);
        let task_cancel = cancel.clone();

        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
        }

        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {
                    debug!("proactive refresh timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    let Some(target) = target.upgrade() else {
                        return;
                    };
                    debug!("proactive refresh timer fired");
                    if let Err(err) = target.refresh().await {
                        warn!(error = %err, "proactive token refresh failed");
                    }
                }
            }
        });

        *slot = Some(TimerSlot { cancel, handle, deadline: Instant::now().checked_add(delay) });
        debug!(delay_secs = delay.as_secs(), "proactive refresh scheduled");
    }

    /// Delay before the refresh for a token that expires in `expires_in`
    pub fn delay_for(&self, expires_in: Duration) -> Duration {
        let delay = match expires_in.checked_sub(self.margin) {
            Some(delay) if !delay.is_zero() => delay,
            _ => expires_in / 2,
        };
        delay.max(MIN_REFRESH_DELAY)
    }

    /// Cancel the pending timer, if any
    pub fn clear(&self) {
        if let Some(previous) = self.slot.lock().take() {
            previous.cancel.cancel();
            debug!("proactive refresh cleared");
        }
    }

    /// Whether a timer is waiting to fire
    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|slot| !slot.cancel.is_cancelled() && !slot.handle.is_finished())
    }

    /// When the pending timer fires; `None` when idle or too far out to
    /// represent
    pub fn deadline(&self) -> Option<Instant> {
        self.slot
            .lock()
            .as_ref()
            .filter(|slot| !slot.handle.is_finished())
            .and_then(|slot| slot.deadline)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.get_mut().take() {
            slot.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("margin", &self.margin)
            .field("armed", &self.is_armed())
            .finish()
    }
}
