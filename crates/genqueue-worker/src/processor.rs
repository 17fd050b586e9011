//! One step of the worker loop: pop, admit, generate, persist, complete.

use std::sync::Arc;

use tracing::{info, warn};

use genqueue_core::result::AppResult;
use genqueue_core::traits::results::{ResultRecord, ResultStore};
use genqueue_core::types::JobId;
use genqueue_entity::job::JobOutcome;
use genqueue_inference::InferenceClient;

use crate::queue::{Completion, JobQueue, JobRecord};
use crate::rate_limiter::RateLimiter;

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The queue was empty.
    Idle,
    /// The job was processed and marked completed.
    Completed {
        /// Job id.
        job_id: JobId,
        /// Whether a model produced text.
        outcome: JobOutcome,
    },
    /// The rate limiter rejected the call; the job went back to the tail.
    Requeued(JobId),
    /// The id had a missing or undecodable record, or was already completed.
    Discarded(JobId),
}

/// Processes queued jobs one at a time.
#[derive(Debug, Clone)]
pub struct JobProcessor {
    queue: JobQueue,
    limiter: RateLimiter,
    inference: InferenceClient,
    results: Arc<dyn ResultStore>,
}

impl JobProcessor {
    /// Create a processor.
    pub fn new(
        queue: JobQueue,
        limiter: RateLimiter,
        inference: InferenceClient,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            queue,
            limiter,
            inference,
            results,
        }
    }

    /// The queue this processor drains.
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Process the job at the head of the queue.
    ///
    /// Inference failures are recorded as failed text. Store and database
    /// failures are returned.
    pub async fn process_next(&self) -> AppResult<Step> {
        let Some(job_id) = self.queue.pop().await? else {
            return Ok(Step::Idle);
        };

        let job = match self.queue.read(job_id).await? {
            JobRecord::Found(job) => job,
            JobRecord::Missing => {
                warn!(job_id = %job_id, "Job record missing, discarding");
                self.queue.discard(job_id).await?;
                return Ok(Step::Discarded(job_id));
            }
            JobRecord::Malformed(reason) => {
                warn!(job_id = %job_id, reason = %reason, "Job record undecodable, discarding");
                self.queue.discard(job_id).await?;
                return Ok(Step::Discarded(job_id));
            }
        };

        if job.status.is_terminal() {
            info!(job_id = %job_id, "Job already completed, discarding duplicate");
            self.queue.discard(job_id).await?;
            return Ok(Step::Discarded(job_id));
        }

        if !self.limiter.try_admit().await? {
            self.queue.requeue(job_id).await?;
            return Ok(Step::Requeued(job_id));
        }

        let generation = self.inference.generate(&job.prompt).await;
        let outcome = if generation.is_generated() {
            JobOutcome::Generated
        } else {
            JobOutcome::Failed
        };

        let record = ResultRecord {
            job_id,
            text: generation.text().to_string(),
            model: generation.model().map(str::to_string),
            succeeded: generation.is_generated(),
        };
        let row_id = self.results.save(&job.namespace, &record).await?;

        self.queue
            .complete(
                job_id,
                &Completion {
                    result_ref: format!("{}/{row_id}", job.namespace),
                    outcome,
                    model: record.model.clone(),
                },
            )
            .await?;

        info!(
            job_id = %job_id,
            namespace = %job.namespace,
            outcome = outcome.as_str(),
            model = record.model.as_deref().unwrap_or("-"),
            "Processed job"
        );
        Ok(Step::Completed { job_id, outcome })
    }
}
