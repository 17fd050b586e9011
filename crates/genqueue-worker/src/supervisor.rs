//! Cron supervisor that restarts the worker loop when work is waiting.
//!
//! Covers jobs stranded by a worker that died mid-drain or exited just as a
//! job arrived: every tick, if the queue or in-flight list is non-empty and
//! nobody holds the lock, a new loop is started.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use genqueue_core::error::AppError;
use genqueue_core::result::AppResult;

use crate::coordinator::WorkerCoordinator;

/// Periodic worker supervisor.
pub struct Supervisor {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Coordinator to poke
    coordinator: WorkerCoordinator,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor").finish()
    }
}

impl Supervisor {
    /// Create a new supervisor
    pub async fn new(coordinator: WorkerCoordinator) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            coordinator,
        })
    }

    /// Register the supervision tick. An empty schedule disables it.
    pub async fn register(&self, schedule: &str) -> AppResult<()> {
        if schedule.trim().is_empty() {
            tracing::info!("Worker supervisor disabled");
            return Ok(());
        }

        let coordinator = self.coordinator.clone();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let coordinator = coordinator.clone();
            Box::pin(async move {
                if let Err(e) = tick(&coordinator).await {
                    tracing::warn!("Worker supervisor tick failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid supervisor schedule '{schedule}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add supervisor schedule: {}", e)))?;

        tracing::info!("Registered: worker supervisor ({})", schedule);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Worker supervisor started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Worker supervisor shut down");
        Ok(())
    }
}

/// One supervision pass. Returns whether a loop was started.
pub async fn tick(coordinator: &WorkerCoordinator) -> AppResult<bool> {
    let stats = coordinator.queue().stats().await?;
    if stats.queued == 0 && stats.in_flight == 0 {
        return Ok(false);
    }

    let started = coordinator.ensure_running().await?;
    if started {
        tracing::info!(
            queued = stats.queued,
            in_flight = stats.in_flight,
            "Supervisor restarted idle worker"
        );
    }
    Ok(started)
}

#[cfg(test)]
mod tests {
    use genqueue_core::types::{Environment, Namespace};
    use genqueue_entity::job::{Job, JobStatus};

    use super::*;
    use crate::testing::{Harness, StubProvider};

    #[tokio::test]
    async fn test_tick_idle_queue_does_nothing() {
        let h = Harness::new(StubProvider::default());
        assert!(!tick(&h.coordinator).await.unwrap());
    }

    #[tokio::test]
    async fn test_tick_starts_worker_for_stranded_job() {
        let h = Harness::new(StubProvider::default());
        let job = Job::queued("stranded", Environment::Uat, Namespace::new("SSP-dev"));
        h.coordinator.queue().enqueue(&job).await.unwrap();

        assert!(tick(&h.coordinator).await.unwrap());

        // Waiting for the lock to be dropped means the loop has drained.
        while h.coordinator.is_running().await.unwrap() {
            tokio::task::yield_now().await;
        }
        let loaded = h.coordinator.queue().load(job.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_tick_respects_running_worker() {
        let h = Harness::new(StubProvider::default());
        let _held = h.coordinator.lock().try_acquire().await.unwrap().unwrap();
        let job = Job::queued("waiting", Environment::Uat, Namespace::new("SSP-dev"));
        h.coordinator.queue().enqueue(&job).await.unwrap();

        assert!(!tick(&h.coordinator).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_schedule_rejected() {
        let h = Harness::new(StubProvider::default());
        let supervisor = Supervisor::new(h.coordinator.clone()).await.unwrap();
        assert!(supervisor.register("not a cron").await.is_err());
        assert!(supervisor.register("").await.is_ok());
    }
}
