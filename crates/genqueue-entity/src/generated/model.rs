//! Generated-text row model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use genqueue_core::traits::results::StoredResult;
use genqueue_core::types::{GeneratedTextId, JobId};

/// A row of the `generated_texts` table in a namespace schema.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedText {
    /// Row identifier.
    pub id: GeneratedTextId,
    /// Job the text belongs to.
    pub job_id: JobId,
    /// Generated text, or the failure message.
    pub text: String,
    /// Model that produced the text.
    pub model: Option<String>,
    /// Whether inference succeeded.
    pub succeeded: bool,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl From<GeneratedText> for StoredResult {
    fn from(row: GeneratedText) -> Self {
        Self {
            id: row.id,
            job_id: row.job_id,
            text: row.text,
            model: row.model,
            succeeded: row.succeeded,
            created_at: row.created_at,
        }
    }
}
