//! Prompt submission and job lookup handlers.

use axum::Json;
use axum::extract::{Path, State};

use genqueue_service::JobView;

use crate::dto::request::EnqueueRequest;
use crate::dto::response::{EnqueueResponse, QueueResponse};
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, parse_job_id};
use crate::state::AppState;

/// POST /enqueue
pub async fn enqueue(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    let job = state
        .prompt_service
        .enqueue(&req.prompt, &req.environment)
        .await?;
    Ok(Json(job.into()))
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobView>, ApiError> {
    let job_id = parse_job_id(&id)?;
    let job = state.prompt_service.get_job(job_id).await?;
    Ok(Json(job))
}

/// GET /queue
pub async fn queue(State(state): State<AppState>) -> Result<Json<QueueResponse>, ApiError> {
    let overview = state.prompt_service.queue_overview().await?;
    Ok(Json(overview.into()))
}
