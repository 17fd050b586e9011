//! Job entity model and its shared-store hash encoding.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use genqueue_core::error::AppError;
use genqueue_core::result::AppResult;
use genqueue_core::types::{Environment, JobId, Namespace};

use super::status::{JobOutcome, JobStatus};

/// Hash field names of a job record.
pub mod fields {
    /// Prompt text.
    pub const PROMPT: &str = "prompt";
    /// Lifecycle status.
    pub const STATUS: &str = "status";
    /// Resolved environment token.
    pub const ENVIRONMENT: &str = "environment";
    /// Result namespace.
    pub const NAMESPACE: &str = "namespace";
    /// Result reference (`<namespace>/<row id>`).
    pub const RESULT: &str = "result";
    /// Completion outcome.
    pub const OUTCOME: &str = "outcome";
    /// Model that produced the result.
    pub const MODEL: &str = "model";
    /// RFC 3339 creation time.
    pub const CREATED_AT: &str = "created_at";
    /// RFC 3339 completion time.
    pub const COMPLETED_AT: &str = "completed_at";
}

/// A text-generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Prompt to generate from.
    pub prompt: String,
    /// Current job status.
    pub status: JobStatus,
    /// Environment the job was submitted for.
    pub environment: Environment,
    /// Namespace the result is persisted in.
    pub namespace: Namespace,
    /// Reference to the persisted result, set on completion.
    pub result: Option<String>,
    /// How the job ended, set on completion.
    pub outcome: Option<JobOutcome>,
    /// Model that produced the result.
    pub model: Option<String>,
    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the job completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a fresh queued job.
    pub fn queued(prompt: impl Into<String>, environment: Environment, namespace: Namespace) -> Self {
        Self {
            id: JobId::new(),
            prompt: prompt.into(),
            status: JobStatus::Queued,
            environment,
            namespace,
            result: None,
            outcome: None,
            model: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Hash fields written when the job is created.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            (fields::PROMPT, self.prompt.clone()),
            (fields::STATUS, self.status.as_str().to_string()),
            (fields::ENVIRONMENT, self.environment.as_str().to_string()),
            (fields::NAMESPACE, self.namespace.as_str().to_string()),
            (fields::CREATED_AT, self.created_at.to_rfc3339()),
        ];
        if let Some(result) = &self.result {
            out.push((fields::RESULT, result.clone()));
        }
        if let Some(outcome) = self.outcome {
            out.push((fields::OUTCOME, outcome.as_str().to_string()));
        }
        if let Some(model) = &self.model {
            out.push((fields::MODEL, model.clone()));
        }
        if let Some(completed_at) = self.completed_at {
            out.push((fields::COMPLETED_AT, completed_at.to_rfc3339()));
        }
        out
    }

    /// Decode a job record. Returns `None` when the hash is empty.
    ///
    /// Records written by older producers may lack everything but `prompt`;
    /// missing fields fall back to a queued UAT job.
    pub fn from_fields(
        id: JobId,
        map: &HashMap<String, String>,
        default_namespace: &Namespace,
    ) -> AppResult<Option<Self>> {
        if map.is_empty() {
            return Ok(None);
        }

        let prompt = map
            .get(fields::PROMPT)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("Job {id} has no prompt field")))?;

        let status = match map.get(fields::STATUS) {
            Some(s) => s.parse().map_err(AppError::internal)?,
            None => JobStatus::Queued,
        };

        let environment = map
            .get(fields::ENVIRONMENT)
            .map(|s| Environment::from_token(s))
            .unwrap_or(Environment::Uat);

        let namespace = map
            .get(fields::NAMESPACE)
            .map(Namespace::new)
            .unwrap_or_else(|| default_namespace.clone());

        let outcome = match map.get(fields::OUTCOME) {
            Some(s) => Some(s.parse().map_err(AppError::internal)?),
            None => None,
        };

        Ok(Some(Self {
            id,
            prompt,
            status,
            environment,
            namespace,
            result: map.get(fields::RESULT).cloned(),
            outcome,
            model: map.get(fields::MODEL).cloned(),
            created_at: parse_time(map.get(fields::CREATED_AT))?.unwrap_or_else(Utc::now),
            completed_at: parse_time(map.get(fields::COMPLETED_AT))?,
        }))
    }
}

fn parse_time(value: Option<&String>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| AppError::internal(format!("Invalid timestamp '{s}': {e}")))
        })
        .transpose()
}
