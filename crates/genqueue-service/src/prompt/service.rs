//! Enqueue prompts, look up jobs and report queue depth.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use genqueue_core::config::EnvironmentsConfig;
use genqueue_core::error::AppError;
use genqueue_core::traits::results::ResultStore;
use genqueue_core::types::{Environment, JobId, Namespace};
use genqueue_entity::job::{Job, JobOutcome, JobStatus};
use genqueue_worker::WorkerCoordinator;

/// Acknowledgement of an accepted prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnqueuedJob {
    /// New job id.
    pub job_id: JobId,
    /// Environment the token resolved to.
    pub environment: Environment,
    /// Namespace the result will be written to.
    pub namespace: Namespace,
}

/// A job as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    /// Job id.
    pub id: JobId,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Environment.
    pub environment: Environment,
    /// Result namespace.
    pub namespace: Namespace,
    /// How the job ended.
    pub outcome: Option<JobOutcome>,
    /// Model that produced the text.
    pub model: Option<String>,
    /// Reference to the persisted result.
    pub result_ref: Option<String>,
    /// Generated text or failure message, once completed.
    pub text: Option<String>,
    /// Enqueue time.
    pub created_at: DateTime<Utc>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Queue depth and worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueOverview {
    /// Jobs waiting.
    pub queued: u64,
    /// Jobs popped but not completed.
    pub in_flight: u64,
    /// Whether a worker currently holds the lock.
    pub worker_running: bool,
}

/// Accepts prompts and serves job state.
#[derive(Debug, Clone)]
pub struct PromptService {
    /// Worker coordinator.
    coordinator: WorkerCoordinator,
    /// Result store for completed text.
    results: Arc<dyn ResultStore>,
    /// Environment to namespace mapping.
    environments: EnvironmentsConfig,
    /// Longest accepted prompt, in characters.
    max_prompt_chars: usize,
}

impl PromptService {
    /// Creates a new prompt service.
    pub fn new(
        coordinator: WorkerCoordinator,
        results: Arc<dyn ResultStore>,
        environments: EnvironmentsConfig,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            coordinator,
            results,
            environments,
            max_prompt_chars,
        }
    }

    /// Queues a prompt and makes sure a worker is draining the queue.
    ///
    /// Returns as soon as the job is queued. Unrecognised environment
    /// tokens resolve to UAT.
    pub async fn enqueue(&self, prompt: &str, environment: &str) -> Result<EnqueuedJob, AppError> {
        if prompt.trim().is_empty() {
            return Err(AppError::validation("Prompt must not be empty"));
        }
        let chars = prompt.chars().count();
        if chars > self.max_prompt_chars {
            return Err(AppError::validation(format!(
                "Prompt is {chars} characters; the maximum is {}",
                self.max_prompt_chars
            )));
        }

        let environment = Environment::from_token(environment);
        let namespace = environment.namespace(&self.environments);
        let job = Job::queued(prompt, environment, namespace.clone());

        self.coordinator.queue().enqueue(&job).await?;
        info!(job_id = %job.id, environment = %environment, namespace = %namespace, "Prompt queued");

        // The supervisor picks the job up if this trigger fails.
        if let Err(e) = self.coordinator.ensure_running().await {
            warn!(job_id = %job.id, error = %e, "Failed to trigger worker");
        }

        Ok(EnqueuedJob {
            job_id: job.id,
            environment,
            namespace,
        })
    }

    /// Gets a job, with its result text once completed.
    pub async fn get_job(&self, job_id: JobId) -> Result<JobView, AppError> {
        let job = self
            .coordinator
            .queue()
            .load(job_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {job_id} not found")))?;

        let text = if job.status.is_terminal() {
            self.results
                .find_by_job(&job.namespace, job_id)
                .await?
                .map(|row| row.text)
        } else {
            None
        };

        Ok(JobView {
            id: job.id,
            status: job.status,
            environment: job.environment,
            namespace: job.namespace,
            outcome: job.outcome,
            model: job.model,
            result_ref: job.result,
            text,
            created_at: job.created_at,
            completed_at: job.completed_at,
        })
    }

    /// Current queue depth and worker state.
    pub async fn queue_overview(&self) -> Result<QueueOverview, AppError> {
        let stats = self.coordinator.queue().stats().await?;
        Ok(QueueOverview {
            queued: stats.queued,
            in_flight: stats.in_flight,
            worker_running: self.coordinator.is_running().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use genqueue_core::error::ErrorKind;

    use super::*;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn test_enqueue_maps_environment() {
        let ctx = TestContext::new();
        let svc = ctx.prompt_service();

        let uat = svc.enqueue("a", "UAT").await.unwrap();
        let prod = svc.enqueue("b", "PROD").await.unwrap();
        let other = svc.enqueue("c", "STAGING").await.unwrap();

        assert_eq!(uat.namespace.as_str(), "SSP-dev");
        assert_eq!(prod.namespace.as_str(), "SSP-prod");
        assert_eq!(prod.environment, Environment::Prod);
        assert_eq!(other.namespace.as_str(), "SSP-dev");
        assert_eq!(other.environment, Environment::Uat);
    }

    #[tokio::test]
    async fn test_enqueue_rejects_blank_prompt() {
        let ctx = TestContext::new();
        let err = ctx.prompt_service().enqueue("   ", "UAT").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_enqueue_rejects_oversized_prompt() {
        let ctx = TestContext::new();
        let prompt = "x".repeat(ctx.max_prompt_chars + 1);
        let err = ctx.prompt_service().enqueue(&prompt, "UAT").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_enqueue_returns_before_processing() {
        let ctx = TestContext::with_slow_inference(std::time::Duration::from_secs(3600));
        let svc = ctx.prompt_service();

        let queued = svc.enqueue("hi", "UAT").await.unwrap();
        assert!(svc.queue_overview().await.unwrap().worker_running);
        let view = svc.get_job(queued.job_id).await.unwrap();
        assert_eq!(view.status, JobStatus::Queued);
        assert!(view.text.is_none());
    }

    #[tokio::test]
    async fn test_completed_job_includes_text() {
        let ctx = TestContext::new();
        let svc = ctx.prompt_service();

        let queued = svc.enqueue("hi", "PROD").await.unwrap();
        ctx.wait_idle().await;

        let view = svc.get_job(queued.job_id).await.unwrap();
        assert_eq!(view.status, JobStatus::Completed);
        assert_eq!(view.outcome, Some(JobOutcome::Generated));
        assert_eq!(view.text.as_deref(), Some("primary: hi"));
        assert!(view.result_ref.unwrap().starts_with("SSP-prod/"));
    }

    #[tokio::test]
    async fn test_unknown_job_not_found() {
        let ctx = TestContext::new();
        let err = ctx.prompt_service().get_job(JobId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_queue_overview() {
        let ctx = TestContext::new();
        let svc = ctx.prompt_service();
        let overview = svc.queue_overview().await.unwrap();
        assert_eq!(
            overview,
            QueueOverview {
                queued: 0,
                in_flight: 0,
                worker_running: false
            }
        );
    }
}
