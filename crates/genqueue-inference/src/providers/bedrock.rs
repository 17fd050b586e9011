//! AWS Bedrock runtime provider for Llama 3 models.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use tracing::{debug, info};

use genqueue_core::config::InferenceConfig;
use genqueue_core::traits::inference::{InferenceError, InferenceProvider};

use crate::prompt::{LlamaRequest, LlamaResponse};

/// Bedrock `InvokeModel` provider.
#[derive(Debug, Clone)]
pub struct BedrockProvider {
    client: Client,
    max_gen_len: u32,
    temperature: f32,
}

impl BedrockProvider {
    /// Build a provider from configuration.
    ///
    /// Credentials come from the default AWS provider chain.
    pub async fn new(config: &InferenceConfig) -> Self {
        info!(region = %config.region, "Initializing Bedrock inference provider");
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::from_client(Client::new(&sdk_config), config)
    }

    /// Wrap an existing SDK client.
    pub fn from_client(client: Client, config: &InferenceConfig) -> Self {
        Self {
            client,
            max_gen_len: config.max_gen_len,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl InferenceProvider for BedrockProvider {
    fn provider_name(&self) -> &str {
        "bedrock"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, InferenceError> {
        let request = LlamaRequest::new(prompt, self.max_gen_len, self.temperature);
        let body = serde_json::to_vec(&request)
            .map_err(|e| InferenceError::Terminal(format!("Failed to encode request: {e}")))?;

        let output = self
            .client
            .invoke_model()
            .model_id(model)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(classify)?;

        let response: LlamaResponse = serde_json::from_slice(output.body().as_ref())
            .map_err(|e| InferenceError::Terminal(format!("Malformed model response: {e}")))?;

        debug!(
            model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            chars = response.generation.len(),
            "Bedrock generation finished"
        );

        if response.generation.trim().is_empty() {
            return Err(InferenceError::Terminal(format!(
                "Model {model} returned an empty generation"
            )));
        }
        Ok(response.generation)
    }
}

/// Sort an SDK failure into retryable and permanent.
fn classify(err: SdkError<InvokeModelError>) -> InferenceError {
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(ctx) => match ctx.err() {
            InvokeModelError::ThrottlingException(_)
            | InvokeModelError::ServiceUnavailableException(_)
            | InvokeModelError::ModelNotReadyException(_)
            | InvokeModelError::ModelTimeoutException(_)
            | InvokeModelError::InternalServerException(_) => InferenceError::Transient(message),
            _ => InferenceError::Terminal(message),
        },
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            InferenceError::Transient(message)
        }
        _ => InferenceError::Terminal(message),
    }
}
