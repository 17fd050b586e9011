//! Shared application state for Axum handlers.

use std::sync::Arc;

use genqueue_core::config::AppConfig;
use genqueue_service::{HealthService, PromptService};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Prompt queueing and job lookup.
    pub prompt_service: Arc<PromptService>,
    /// Dependency probes.
    pub health_service: Arc<HealthService>,
}
