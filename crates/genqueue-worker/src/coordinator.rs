//! Single-flight worker coordination.
//!
//! `IDLE -> RUNNING -> IDLE`: RUNNING is entered only by taking the shared
//! worker lock. The drain runs in its own task whose join result is observed
//! before the lock is released, so release happens on success, on error and
//! on panic alike. A keep-alive renews the lock during the drain; once a
//! renewal finds the token gone the drain stops after its current job.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use genqueue_core::config::WorkerConfig;
use genqueue_core::error::AppError;
use genqueue_core::result::AppResult;
use genqueue_core::traits::results::ResultStore;
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::Namespace;
use genqueue_entity::job::JobOutcome;
use genqueue_inference::InferenceClient;

use crate::lock::{LockToken, WorkerLock};
use crate::processor::{JobProcessor, Step};
use crate::queue::JobQueue;
use crate::rate_limiter::RateLimiter;

/// Counters for one lock tenure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Orphaned in-flight jobs moved back to the queue at acquisition.
    pub recovered: u64,
    /// Jobs completed with generated text.
    pub generated: u64,
    /// Jobs completed with a failure message.
    pub failed: u64,
    /// Rate-limit requeues.
    pub requeued: u64,
    /// Ids discarded for a missing, undecodable or completed record.
    pub discarded: u64,
    /// The lock was taken over and the drain stopped early.
    pub lock_lost: bool,
}

#[derive(Debug)]
struct Inner {
    lock: WorkerLock,
    processor: JobProcessor,
    backoff: Duration,
}

/// Ensures at most one worker loop runs across every process sharing the store.
#[derive(Debug, Clone)]
pub struct WorkerCoordinator {
    inner: Arc<Inner>,
}

impl WorkerCoordinator {
    /// Create a coordinator from its parts.
    pub fn new(lock: WorkerLock, processor: JobProcessor, backoff: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                lock,
                processor,
                backoff,
            }),
        }
    }

    /// Wire a coordinator over a shared store.
    pub fn build(
        store: Arc<dyn SharedStore>,
        results: Arc<dyn ResultStore>,
        inference: InferenceClient,
        config: &WorkerConfig,
        default_namespace: Namespace,
    ) -> Self {
        let queue = JobQueue::new(Arc::clone(&store), default_namespace);
        let limiter = RateLimiter::new(Arc::clone(&store), &config.rate_limit);
        let lock = WorkerLock::new(store, &config.lock);
        let processor = JobProcessor::new(queue, limiter, inference, results);
        Self::new(lock, processor, config.requeue_backoff())
    }

    /// Queue handle.
    pub fn queue(&self) -> &JobQueue {
        self.inner.processor.queue()
    }

    /// Lock handle.
    pub fn lock(&self) -> &WorkerLock {
        &self.inner.lock
    }

    /// Whether any process currently holds the worker lock.
    pub async fn is_running(&self) -> AppResult<bool> {
        Ok(self.inner.lock.holder().await?.is_some())
    }

    /// Start a worker loop unless one is already running. Never blocks on
    /// processing; returns whether this call started the loop.
    pub async fn ensure_running(&self) -> AppResult<bool> {
        Ok(self.spawn_if_idle().await?.is_some())
    }

    /// Like [`ensure_running`](Self::ensure_running) but hands back the
    /// supervising task so callers can wait for the drain to finish.
    pub async fn spawn_if_idle(&self) -> AppResult<Option<JoinHandle<()>>> {
        let Some(token) = self.inner.lock.try_acquire().await? else {
            return Ok(None);
        };

        let this = self.clone();
        Ok(Some(tokio::spawn(async move { this.supervise(token).await })))
    }

    async fn supervise(self, mut token: LockToken) {
        loop {
            let outcome = self.run_locked(&token).await;

            if let Err(e) = self.inner.lock.release(&token).await {
                error!(error = %e, "Failed to release worker lock; it will expire");
            }

            match outcome {
                Ok(report) if report.lock_lost => {
                    warn!(
                        generated = report.generated,
                        failed = report.failed,
                        "Worker loop stopped: lock taken over"
                    );
                    return;
                }
                Ok(report) => info!(
                    generated = report.generated,
                    failed = report.failed,
                    requeued = report.requeued,
                    discarded = report.discarded,
                    recovered = report.recovered,
                    "Worker loop finished"
                ),
                Err(e) => {
                    error!(error = %e, "Worker loop aborted");
                    return;
                }
            }

            // Jobs pushed between the final empty pop and the release.
            match self.queue().len().await {
                Ok(0) => return,
                Ok(depth) => match self.inner.lock.try_acquire().await {
                    Ok(Some(next)) => {
                        debug!(depth, "Jobs arrived during shutdown, resuming");
                        token = next;
                    }
                    Ok(None) => return,
                    Err(e) => {
                        error!(error = %e, "Failed to re-acquire worker lock");
                        return;
                    }
                },
                Err(e) => {
                    error!(error = %e, "Failed to re-check queue depth");
                    return;
                }
            }
        }
    }

    async fn run_locked(&self, token: &LockToken) -> AppResult<DrainReport> {
        let (lost_tx, lost_rx) = watch::channel(false);
        let keepalive = self.spawn_keepalive(token.clone(), lost_tx);

        let this = self.clone();
        let joined = tokio::spawn(async move { this.drain(lost_rx).await }).await;
        keepalive.abort();

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(AppError::internal("Worker loop panicked")),
            Err(e) => Err(AppError::internal(format!("Worker loop cancelled: {e}"))),
        }
    }

    fn spawn_keepalive(&self, token: LockToken, lost: watch::Sender<bool>) -> JoinHandle<()> {
        let lock = self.inner.lock.clone();
        let period = lock.ttl() / 3;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match lock.renew(&token).await {
                    Ok(true) => trace!("Worker lock renewed"),
                    Ok(false) => {
                        warn!("Worker lock lost; stopping after the current job");
                        lost.send_replace(true);
                        return;
                    }
                    Err(e) => warn!(error = %e, "Worker lock renewal failed"),
                }
            }
        })
    }

    async fn drain(&self, lost: watch::Receiver<bool>) -> AppResult<DrainReport> {
        let mut report = DrainReport {
            recovered: self.queue().reconcile().await?.requeued,
            ..DrainReport::default()
        };

        loop {
            if *lost.borrow() {
                report.lock_lost = true;
                return Ok(report);
            }
            match self.inner.processor.process_next().await? {
                Step::Idle => return Ok(report),
                Step::Completed { outcome, .. } => match outcome {
                    JobOutcome::Generated => report.generated += 1,
                    JobOutcome::Failed => report.failed += 1,
                },
                Step::Requeued(job_id) => {
                    report.requeued += 1;
                    debug!(
                        job_id = %job_id,
                        backoff_secs = self.inner.backoff.as_secs(),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(self.inner.backoff).await;
                }
                Step::Discarded(_) => report.discarded += 1,
            }
        }
    }
}
