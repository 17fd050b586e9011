//! Primary/fallback failover over an [`InferenceProvider`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use genqueue_core::config::InferenceConfig;
use genqueue_core::traits::inference::InferenceProvider;

/// Message recorded when no model produced text.
pub const FAILURE_MESSAGE: &str = "Failed to generate text: Both primary and fallback models failed.";

/// Result of generating text for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// A model produced text.
    Generated {
        /// Generated text.
        text: String,
        /// Model that produced it.
        model: String,
    },
    /// Every attempt failed.
    Failed {
        /// Human-readable failure text stored in place of a generation.
        message: String,
    },
}

impl GenerationOutcome {
    /// Text to persist: the generation, or the failure message.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { text, .. } => text,
            Self::Failed { message } => message,
        }
    }

    /// Model that produced the text, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Generated { model, .. } => Some(model),
            Self::Failed { .. } => None,
        }
    }

    /// Whether a model produced text.
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

/// Calls the primary model, then the fallback exactly once if the primary fails.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    provider: Arc<dyn InferenceProvider>,
    primary_model: String,
    fallback_model: Option<String>,
}

impl InferenceClient {
    /// Create a client from a provider and explicit model ids.
    ///
    /// An empty fallback id disables the fallback attempt.
    pub fn new(
        provider: Arc<dyn InferenceProvider>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        let fallback_model = fallback_model.into();
        Self {
            provider,
            primary_model: primary_model.into(),
            fallback_model: (!fallback_model.trim().is_empty()).then_some(fallback_model),
        }
    }

    /// Create a client using the configured model ids.
    pub fn from_config(provider: Arc<dyn InferenceProvider>, config: &InferenceConfig) -> Self {
        Self::new(
            provider,
            config.primary_model.clone(),
            config.fallback_model.clone(),
        )
    }

    /// Primary model id.
    pub fn primary_model(&self) -> &str {
        &self.primary_model
    }

    /// Generate text for `prompt`. Never returns an error: a double failure
    /// becomes [`GenerationOutcome::Failed`].
    pub async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let provider = self.provider.provider_name();

        let primary_err = match self.provider.generate(&self.primary_model, prompt).await {
            Ok(text) => {
                return GenerationOutcome::Generated {
                    text,
                    model: self.primary_model.clone(),
                };
            }
            Err(e) => e,
        };

        warn!(
            provider,
            model = %self.primary_model,
            transient = primary_err.is_transient(),
            error = %primary_err.message(),
            "Primary model failed"
        );

        let Some(fallback) = &self.fallback_model else {
            return GenerationOutcome::Failed {
                message: FAILURE_MESSAGE.to_string(),
            };
        };

        info!(provider, model = %fallback, "Switching to fallback model");
        match self.provider.generate(fallback, prompt).await {
            Ok(text) => GenerationOutcome::Generated {
                text,
                model: fallback.clone(),
            },
            Err(e) => {
                warn!(
                    provider,
                    model = %fallback,
                    transient = e.is_transient(),
                    error = %e.message(),
                    "Fallback model failed"
                );
                GenerationOutcome::Failed {
                    message: FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }
}
