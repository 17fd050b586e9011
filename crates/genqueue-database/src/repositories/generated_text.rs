//! Generated-text repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use genqueue_core::error::{AppError, ErrorKind};
use genqueue_core::result::AppResult;
use genqueue_core::traits::results::{ResultRecord, ResultStore, StoredResult};
use genqueue_core::types::{GeneratedTextId, JobId, Namespace};
use genqueue_entity::generated::GeneratedText;

use crate::migration::results_table;

/// Repository persisting generated text into per-namespace schemas.
#[derive(Debug, Clone)]
pub struct GeneratedTextRepository {
    pool: PgPool,
}

impl GeneratedTextRepository {
    /// Create a new generated-text repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for GeneratedTextRepository {
    async fn save(
        &self,
        namespace: &Namespace,
        record: &ResultRecord,
    ) -> AppResult<GeneratedTextId> {
        let id = GeneratedTextId::new();
        let sql = format!(
            "INSERT INTO {} (id, job_id, text, model, succeeded) VALUES ($1, $2, $3, $4, $5)",
            results_table(namespace)
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(record.job_id)
            .bind(&record.text)
            .bind(record.model.as_deref())
            .bind(record.succeeded)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to save generated text", e)
            })?;

        debug!(job_id = %record.job_id, namespace = %namespace, row_id = %id, "Saved generated text");
        Ok(id)
    }

    async fn find_by_job(
        &self,
        namespace: &Namespace,
        job_id: JobId,
    ) -> AppResult<Option<StoredResult>> {
        let sql = format!(
            "SELECT id, job_id, text, model, succeeded, created_at FROM {} \
             WHERE job_id = $1 ORDER BY created_at DESC LIMIT 1",
            results_table(namespace)
        );

        let row = sqlx::query_as::<_, GeneratedText>(&sql)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find generated text", e)
            })?;

        Ok(row.map(StoredResult::from))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
