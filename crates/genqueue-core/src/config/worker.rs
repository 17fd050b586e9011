//! Background worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds to pause after a job is requeued by the rate limiter.
    #[serde(default = "default_requeue_backoff")]
    pub requeue_backoff_seconds: u64,
    /// Cron expression for the supervisor that restarts a worker when the
    /// queue is non-empty and nobody holds the lock. Empty disables it.
    #[serde(default = "default_supervisor_schedule")]
    pub supervisor_schedule: String,
    /// Inference call quota.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Single-worker lock settings.
    #[serde(default)]
    pub lock: LockConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            requeue_backoff_seconds: default_requeue_backoff(),
            supervisor_schedule: default_supervisor_schedule(),
            rate_limit: RateLimitConfig::default(),
            lock: LockConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Requeue backoff as a [`Duration`].
    pub fn requeue_backoff(&self) -> Duration {
        Duration::from_secs(self.requeue_backoff_seconds)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.rate_limit.max_requests == 0 {
            return Err(AppError::configuration(
                "worker.rate_limit.max_requests must be at least 1",
            ));
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(AppError::configuration(
                "worker.rate_limit.window_seconds must be at least 1",
            ));
        }
        if self.lock.ttl_seconds < 3 {
            return Err(AppError::configuration(
                "worker.lock.ttl_seconds must be at least 3",
            ));
        }
        Ok(())
    }
}

/// Sliding-window quota for inference calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted calls per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window(),
        }
    }
}

impl RateLimitConfig {
    /// Window length as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Worker lock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Lock expiry in seconds. The holder renews at a third of this.
    #[serde(default = "default_lock_ttl")]
    pub ttl_seconds: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_lock_ttl(),
        }
    }
}

impl LockConfig {
    /// Lock expiry as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_requeue_backoff() -> u64 {
    5
}

fn default_supervisor_schedule() -> String {
    "*/30 * * * * *".to_string()
}

fn default_max_requests() -> u32 {
    99
}

fn default_window() -> u64 {
    60
}

fn default_lock_ttl() -> u64 {
    60
}
