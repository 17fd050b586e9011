//! Durable result persistence trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{GeneratedTextId, JobId, Namespace};

/// Output of one processed job, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Job the text belongs to.
    pub job_id: JobId,
    /// Generated text, or the failure message when `succeeded` is false.
    pub text: String,
    /// Model that produced the text.
    pub model: Option<String>,
    /// Whether inference succeeded.
    pub succeeded: bool,
}

/// A persisted result as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// Row identifier.
    pub id: GeneratedTextId,
    /// Job the text belongs to.
    pub job_id: JobId,
    /// Generated text or failure message.
    pub text: String,
    /// Model that produced the text.
    pub model: Option<String>,
    /// Whether inference succeeded.
    pub succeeded: bool,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// Durable store for generated text, partitioned by namespace.
#[async_trait]
pub trait ResultStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a record in `namespace`. Returns the new row id.
    async fn save(&self, namespace: &Namespace, record: &ResultRecord)
    -> AppResult<GeneratedTextId>;

    /// Most recent result for a job in `namespace`.
    async fn find_by_job(
        &self,
        namespace: &Namespace,
        job_id: JobId,
    ) -> AppResult<Option<StoredResult>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
