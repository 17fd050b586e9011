//! Route tree.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Builds the application router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    // UTF-8 worst case plus room for the JSON envelope.
    let body_limit = state.config.server.max_prompt_chars as usize * 4 + 4096;

    Router::new()
        .route("/enqueue", post(handlers::prompt::enqueue))
        .route("/jobs/{id}", get(handlers::prompt::get_job))
        .route("/queue", get(handlers::prompt::queue))
        .route("/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_mw::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
