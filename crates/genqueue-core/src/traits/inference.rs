//! Inference provider trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AppError, ErrorKind};

/// Why a single generation attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Throttling, timeouts, unavailable model: another attempt may succeed.
    #[error("transient inference failure: {0}")]
    Transient(String),

    /// Rejected request, access denied, malformed response.
    #[error("inference failure: {0}")]
    Terminal(String),
}

impl InferenceError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// The underlying message without the classification prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transient(msg) | Self::Terminal(msg) => msg,
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::new(ErrorKind::ExternalService, err.to_string())
    }
}

/// A text-generation backend addressed by model identifier.
#[async_trait]
pub trait InferenceProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name for logs.
    fn provider_name(&self) -> &str;

    /// Generate text for `prompt` using `model`.
    ///
    /// Returns non-empty text or an explicit error.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, InferenceError>;
}
