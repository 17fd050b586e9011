//! Sliding-window admission control for inference calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

use genqueue_core::config::RateLimitConfig;
use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;
use genqueue_store::keys;

/// Millisecond clock anchored to wall time at construction and advanced by
/// the tokio clock, so paused-time tests move it too.
#[derive(Debug, Clone, Copy)]
struct WindowClock {
    origin_ms: i64,
    origin: Instant,
}

impl WindowClock {
    fn new() -> Self {
        Self {
            origin_ms: Utc::now().timestamp_millis(),
            origin: Instant::now(),
        }
    }

    fn now_ms(&self) -> i64 {
        self.origin_ms + self.origin.elapsed().as_millis() as i64
    }
}

/// Admits at most `max_requests` calls per trailing `window` across all
/// processes sharing the store.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn SharedStore>,
    max_requests: u32,
    window: Duration,
    clock: WindowClock,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    pub fn new(store: Arc<dyn SharedStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            clock: WindowClock::new(),
        }
    }

    /// Try to admit one call now.
    pub async fn try_admit(&self) -> AppResult<bool> {
        self.try_admit_at(self.clock.now_ms()).await
    }

    /// Try to admit one call at an explicit time in epoch milliseconds.
    ///
    /// A rejection leaves the window untouched.
    pub async fn try_admit_at(&self, now_ms: i64) -> AppResult<bool> {
        let member = format!("{now_ms}-{}", Uuid::new_v4().simple());
        let admitted = self
            .store
            .admit_in_window(
                &keys::rate_window(),
                &member,
                now_ms,
                self.window,
                self.max_requests,
            )
            .await?;

        if admitted {
            trace!(now_ms, "Inference call admitted");
        } else {
            debug!(
                max_requests = self.max_requests,
                window_secs = self.window.as_secs(),
                "Inference quota exhausted"
            );
        }
        Ok(admitted)
    }

    /// Calls admitted within the trailing window.
    pub async fn current_count(&self) -> AppResult<u64> {
        self.store
            .window_count(&keys::rate_window(), self.clock.now_ms(), self.window)
            .await
    }

    /// Configured quota.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}
