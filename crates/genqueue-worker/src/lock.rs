//! Single-flight worker lock held in the shared store.
//!
//! The lock value is a per-acquisition token. Renewal and release compare the
//! token, so a holder whose lock expired cannot extend or delete a lock that
//! now belongs to someone else.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use genqueue_core::config::LockConfig;
use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;
use genqueue_store::keys;

/// Proof of holding the worker lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distributed mutual-exclusion lock for the worker loop.
#[derive(Debug, Clone)]
pub struct WorkerLock {
    store: Arc<dyn SharedStore>,
    ttl: Duration,
}

impl WorkerLock {
    /// Create a lock handle from configuration.
    pub fn new(store: Arc<dyn SharedStore>, config: &LockConfig) -> Self {
        Self::with_ttl(store, Duration::from_secs(config.ttl_seconds))
    }

    /// Create a lock handle with an explicit TTL.
    pub fn with_ttl(store: Arc<dyn SharedStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Lock TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Take the lock if nobody holds it. Contention is `Ok(None)`.
    pub async fn try_acquire(&self) -> AppResult<Option<LockToken>> {
        let token = LockToken::generate();
        let acquired = self
            .store
            .set_nx(&keys::worker_lock(), token.as_str(), self.ttl)
            .await?;

        if acquired {
            debug!(token = %token, ttl_secs = self.ttl.as_secs(), "Worker lock acquired");
            Ok(Some(token))
        } else {
            debug!("Worker lock held elsewhere");
            Ok(None)
        }
    }

    /// Reset the TTL. Returns `false` when `token` no longer holds the lock.
    pub async fn renew(&self, token: &LockToken) -> AppResult<bool> {
        let renewed = self
            .store
            .expire_if_equals(&keys::worker_lock(), token.as_str(), self.ttl)
            .await?;
        if !renewed {
            warn!(token = %token, "Worker lock lost before renewal");
        }
        Ok(renewed)
    }

    /// Release the lock. Returns `false` when `token` no longer held it.
    pub async fn release(&self, token: &LockToken) -> AppResult<bool> {
        let released = self
            .store
            .delete_if_equals(&keys::worker_lock(), token.as_str())
            .await?;
        if released {
            debug!(token = %token, "Worker lock released");
        } else {
            warn!(token = %token, "Worker lock was not held at release");
        }
        Ok(released)
    }

    /// Current holder's token, if any.
    pub async fn holder(&self) -> AppResult<Option<String>> {
        self.store.get(&keys::worker_lock()).await
    }

    /// Delete the lock regardless of holder. Operator use only.
    pub async fn force_release(&self) -> AppResult<()> {
        warn!("Force-releasing worker lock");
        self.store.delete(&keys::worker_lock()).await
    }
}
