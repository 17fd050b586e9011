//! Reliable FIFO job queue over the shared store.
//!
//! Popping moves an id from the queue into the in-flight list in one store
//! operation. The id leaves the in-flight list only once the job is
//! completed, requeued or discarded, so a crash between pop and completion
//! leaves a record the reconciliation sweep can recover.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::{JobId, Namespace};
use genqueue_entity::job::model::fields;
use genqueue_entity::job::{Job, JobOutcome, JobStatus};
use genqueue_store::keys;

/// Completion data written onto a job record.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Reference to the persisted result (`<namespace>/<row id>`).
    pub result_ref: String,
    /// Whether a model produced text.
    pub outcome: JobOutcome,
    /// Model that produced the text.
    pub model: Option<String>,
}

/// Queue depth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Ids waiting in the queue.
    pub queued: u64,
    /// Ids popped but not yet completed.
    pub in_flight: u64,
}

/// Result of a reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Orphaned ids moved back to the queue tail.
    pub requeued: u64,
    /// Ids dropped because their job was already completed or has no record.
    pub dropped: u64,
}

/// A job record as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRecord {
    /// No hash exists for the id.
    Missing,
    /// The hash exists but does not decode; carries the reason.
    Malformed(String),
    /// A decoded job.
    Found(Job),
}

/// Job queue backed by the shared store.
#[derive(Debug, Clone)]
pub struct JobQueue {
    store: Arc<dyn SharedStore>,
    /// Namespace assumed for records that do not carry one.
    default_namespace: Namespace,
}

impl JobQueue {
    /// Create a queue handle.
    pub fn new(store: Arc<dyn SharedStore>, default_namespace: Namespace) -> Self {
        Self {
            store,
            default_namespace,
        }
    }

    /// Write the job record, then append its id to the queue.
    pub async fn enqueue(&self, job: &Job) -> AppResult<()> {
        let record = job.to_fields();
        let pairs: Vec<(&str, &str)> = record.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.store.hash_set(&keys::job(job.id), &pairs).await?;

        let depth = self
            .store
            .push_back(&keys::queue(), &job.id.to_string())
            .await?;

        debug!(job_id = %job.id, namespace = %job.namespace, depth, "Job enqueued");
        Ok(())
    }

    /// Move the head of the queue into the in-flight list.
    ///
    /// Ids that do not parse are removed from the in-flight list and skipped.
    pub async fn pop(&self) -> AppResult<Option<JobId>> {
        loop {
            let Some(raw) = self
                .store
                .move_front_to_back(&keys::queue(), &keys::in_flight())
                .await?
            else {
                return Ok(None);
            };

            match raw.parse::<JobId>() {
                Ok(id) => return Ok(Some(id)),
                Err(e) => {
                    warn!(raw = %raw, error = %e, "Discarding malformed queue entry");
                    self.store.remove_from_list(&keys::in_flight(), &raw).await?;
                }
            }
        }
    }

    /// Load a job record.
    pub async fn load(&self, id: JobId) -> AppResult<Option<Job>> {
        let map = self.store.hash_get_all(&keys::job(id)).await?;
        Job::from_fields(id, &map, &self.default_namespace)
    }

    /// Read a job record, separating undecodable records from store failures.
    ///
    /// Only store errors are returned as `Err`.
    pub async fn read(&self, id: JobId) -> AppResult<JobRecord> {
        let map = self.store.hash_get_all(&keys::job(id)).await?;
        Ok(match Job::from_fields(id, &map, &self.default_namespace) {
            Ok(Some(job)) => JobRecord::Found(job),
            Ok(None) => JobRecord::Missing,
            Err(e) => JobRecord::Malformed(e.message),
        })
    }

    /// Move an in-flight id back to the queue tail.
    pub async fn requeue(&self, id: JobId) -> AppResult<()> {
        let raw = id.to_string();
        self.store.push_back(&keys::queue(), &raw).await?;
        self.store.remove_from_list(&keys::in_flight(), &raw).await?;
        debug!(job_id = %id, "Job requeued");
        Ok(())
    }

    /// Mark a job completed and clear its in-flight entry.
    pub async fn complete(&self, id: JobId, completion: &Completion) -> AppResult<()> {
        let completed_at = Utc::now().to_rfc3339();
        let mut pairs = vec![
            (fields::STATUS, JobStatus::Completed.as_str()),
            (fields::RESULT, completion.result_ref.as_str()),
            (fields::OUTCOME, completion.outcome.as_str()),
            (fields::COMPLETED_AT, completed_at.as_str()),
        ];
        if let Some(model) = &completion.model {
            pairs.push((fields::MODEL, model.as_str()));
        }

        self.store.hash_set(&keys::job(id), &pairs).await?;
        self.store
            .remove_from_list(&keys::in_flight(), &id.to_string())
            .await?;
        Ok(())
    }

    /// Drop an in-flight id without touching its record.
    pub async fn discard(&self, id: JobId) -> AppResult<()> {
        self.store
            .remove_from_list(&keys::in_flight(), &id.to_string())
            .await?;
        Ok(())
    }

    /// Move orphaned in-flight ids back to the queue tail.
    ///
    /// Only safe while holding the worker lock: the in-flight list belongs to
    /// the lock holder.
    pub async fn reconcile(&self) -> AppResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for raw in self.store.list_range(&keys::in_flight()).await? {
            let record = match raw.parse::<JobId>() {
                Ok(id) => self.read(id).await?,
                Err(_) => JobRecord::Missing,
            };

            let recoverable = match record {
                JobRecord::Found(job) => !job.status.is_terminal(),
                JobRecord::Malformed(reason) => {
                    warn!(job_id = %raw, reason = %reason, "Dropping undecodable in-flight job");
                    false
                }
                JobRecord::Missing => false,
            };

            if recoverable {
                self.store.push_back(&keys::queue(), &raw).await?;
                report.requeued += 1;
            } else {
                report.dropped += 1;
            }
            self.store.remove_from_list(&keys::in_flight(), &raw).await?;
        }

        if report.requeued > 0 || report.dropped > 0 {
            info!(
                requeued = report.requeued,
                dropped = report.dropped,
                "Reconciled in-flight jobs"
            );
        }
        Ok(report)
    }

    /// Number of queued ids.
    pub async fn len(&self) -> AppResult<u64> {
        self.store.list_len(&keys::queue()).await
    }

    /// Whether the queue is empty.
    pub async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Ids waiting in the queue, head first. Malformed entries are skipped.
    pub async fn queued_ids(&self) -> AppResult<Vec<JobId>> {
        self.ids(&keys::queue()).await
    }

    /// Ids popped but not yet completed.
    pub async fn in_flight_ids(&self) -> AppResult<Vec<JobId>> {
        self.ids(&keys::in_flight()).await
    }

    async fn ids(&self, list: &str) -> AppResult<Vec<JobId>> {
        Ok(self
            .store
            .list_range(list)
            .await?
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect())
    }

    /// Queue depth snapshot.
    pub async fn stats(&self) -> AppResult<QueueStats> {
        Ok(QueueStats {
            queued: self.store.list_len(&keys::queue()).await?,
            in_flight: self.store.list_len(&keys::in_flight()).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use genqueue_core::config::MemoryStoreConfig;
    use genqueue_core::types::Environment;
    use genqueue_store::memory::MemoryStore;

    use super::*;

    fn queue() -> JobQueue {
        let store = Arc::new(MemoryStore::new(&MemoryStoreConfig::default()));
        JobQueue::new(store, Namespace::new("SSP-dev"))
    }

    fn job(prompt: &str) -> Job {
        Job::queued(prompt, Environment::Uat, Namespace::new("SSP-dev"))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = queue();
        let a = job("a");
        let b = job("b");
        queue.enqueue(&a).await.unwrap();
        queue.enqueue(&b).await.unwrap();

        assert_eq!(queue.pop().await.unwrap(), Some(a.id));
        assert_eq!(queue.pop().await.unwrap(), Some(b.id));
        assert_eq!(queue.pop().await.unwrap(), None);
        assert_eq!(
            queue.stats().await.unwrap(),
            QueueStats {
                queued: 0,
                in_flight: 2
            }
        );
    }

    #[tokio::test]
    async fn test_record_written_with_queue_entry() {
        let queue = queue();
        let j = job("hello");
        queue.enqueue(&j).await.unwrap();
        let loaded = queue.load(j.id).await.unwrap().unwrap();
        assert_eq!(loaded.prompt, "hello");
        assert_eq!(loaded.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_requeue_goes_to_tail() {
        let queue = queue();
        let a = job("a");
        let b = job("b");
        queue.enqueue(&a).await.unwrap();
        queue.enqueue(&b).await.unwrap();

        let popped = queue.pop().await.unwrap().unwrap();
        queue.requeue(popped).await.unwrap();

        assert_eq!(queue.pop().await.unwrap(), Some(b.id));
        assert_eq!(queue.pop().await.unwrap(), Some(a.id));
    }

    #[tokio::test]
    async fn test_complete_clears_in_flight() {
        let queue = queue();
        let j = job("x");
        queue.enqueue(&j).await.unwrap();
        let id = queue.pop().await.unwrap().unwrap();

        queue
            .complete(
                id,
                &Completion {
                    result_ref: "SSP-dev/row".to_string(),
                    outcome: JobOutcome::Generated,
                    model: Some("m".to_string()),
                },
            )
            .await
            .unwrap();

        let loaded = queue.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Completed);
        assert_eq!(loaded.result.as_deref(), Some("SSP-dev/row"));
        assert_eq!(loaded.model.as_deref(), Some("m"));
        assert!(loaded.completed_at.is_some());
        assert_eq!(queue.stats().await.unwrap().in_flight, 0);
    }

    #[tokio::test]
    async fn test_reconcile_requeues_orphans_and_skips_completed() {
        let queue = queue();
        let orphan = job("orphan");
        let done = job("done");
        queue.enqueue(&orphan).await.unwrap();
        queue.enqueue(&done).await.unwrap();
        queue.pop().await.unwrap();
        queue.pop().await.unwrap();

        // Completed but crashed before clearing the in-flight entry.
        queue
            .store
            .hash_set(&keys::job(done.id), &[(fields::STATUS, "completed")])
            .await
            .unwrap();

        let report = queue.reconcile().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                requeued: 1,
                dropped: 1
            }
        );
        assert_eq!(queue.pop().await.unwrap(), Some(orphan.id));
    }

    #[tokio::test]
    async fn test_malformed_entry_skipped() {
        let queue = queue();
        queue.store.push_back(&keys::queue(), "garbage").await.unwrap();
        let j = job("ok");
        queue.enqueue(&j).await.unwrap();

        assert_eq!(queue.pop().await.unwrap(), Some(j.id));
        assert_eq!(queue.stats().await.unwrap().in_flight, 1);
    }

    #[tokio::test]
    async fn test_listing_ids() {
        let queue = queue();
        let a = job("a");
        let b = job("b");
        queue.enqueue(&a).await.unwrap();
        queue.enqueue(&b).await.unwrap();
        queue.pop().await.unwrap();

        assert_eq!(queue.queued_ids().await.unwrap(), vec![b.id]);
        assert_eq!(queue.in_flight_ids().await.unwrap(), vec![a.id]);
    }

    #[tokio::test]
    async fn test_read_separates_malformed_records() {
        let queue = queue();
        let good = job("ok");
        queue.enqueue(&good).await.unwrap();
        let bad = JobId::new();
        queue
            .store
            .hash_set(&keys::job(bad), &[(fields::STATUS, "queued")])
            .await
            .unwrap();

        assert!(matches!(queue.read(good.id).await.unwrap(), JobRecord::Found(_)));
        assert!(matches!(queue.read(bad).await.unwrap(), JobRecord::Malformed(_)));
        assert_eq!(queue.read(JobId::new()).await.unwrap(), JobRecord::Missing);
    }

    #[tokio::test]
    async fn test_reconcile_drops_undecodable_records() {
        let queue = queue();
        let bad = JobId::new();
        queue
            .store
            .hash_set(&keys::job(bad), &[(fields::STATUS, "queued")])
            .await
            .unwrap();
        queue
            .store
            .push_back(&keys::in_flight(), &bad.to_string())
            .await
            .unwrap();

        let report = queue.reconcile().await.unwrap();
        assert_eq!(report, ReconcileReport { requeued: 0, dropped: 1 });
        assert_eq!(queue.stats().await.unwrap(), QueueStats { queued: 0, in_flight: 0 });
    }
}
