//! Inference API configuration.

use serde::{Deserialize, Serialize};

/// Bedrock inference settings.
///
/// Credentials are not part of this section; they are resolved through the
/// standard AWS provider chain (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`,
/// profiles, instance roles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// AWS region hosting the models.
    #[serde(default = "default_region")]
    pub region: String,
    /// Model tried first for every job.
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Model tried once when the primary fails.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    /// Maximum number of generated tokens.
    #[serde(default = "default_max_gen_len")]
    pub max_gen_len: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            max_gen_len: default_max_gen_len(),
            temperature: default_temperature(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_primary_model() -> String {
    "us.meta.llama3-3-70b-instruct-v1:0".to_string()
}

fn default_fallback_model() -> String {
    "us.meta.llama3-1-70b-instruct-v1:0".to_string()
}

fn default_max_gen_len() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.5
}
