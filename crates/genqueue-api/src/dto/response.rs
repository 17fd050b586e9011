//! Response DTOs.

use serde::{Deserialize, Serialize};

use genqueue_service::{EnqueuedJob, HealthReport, QueueOverview};

/// Acknowledgement returned by `POST /enqueue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    /// Always true for an accepted prompt.
    pub success: bool,
    /// New job id.
    pub job_id: String,
    /// Resolved environment.
    pub environment: String,
    /// Namespace the result will land in.
    pub namespace: String,
    /// Fixed acknowledgement text.
    pub message: String,
}

impl From<EnqueuedJob> for EnqueueResponse {
    fn from(job: EnqueuedJob) -> Self {
        Self {
            success: true,
            job_id: job.job_id.to_string(),
            environment: job.environment.as_str().to_string(),
            namespace: job.namespace.as_str().to_string(),
            message: "Prompt added to queue.".to_string(),
        }
    }
}

/// Body of `GET /queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    /// Jobs waiting.
    pub queued: u64,
    /// Jobs being processed or awaiting recovery.
    pub in_flight: u64,
    /// Whether a worker holds the lock.
    pub worker_running: bool,
}

impl From<QueueOverview> for QueueResponse {
    fn from(o: QueueOverview) -> Self {
        Self {
            queued: o.queued,
            in_flight: o.in_flight,
            worker_running: o.worker_running,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Shared store reachable.
    pub store: bool,
    /// Result database reachable.
    pub database: bool,
    /// Server version.
    pub version: String,
}

impl From<HealthReport> for HealthResponse {
    fn from(report: HealthReport) -> Self {
        Self {
            status: if report.is_healthy() { "ok" } else { "degraded" }.to_string(),
            store: report.store,
            database: report.database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
