//! Llama 3 prompt template and request body.

use serde::{Deserialize, Serialize};

/// Wrap a user prompt in the Llama 3 instruct chat template.
pub fn llama3_prompt(prompt: &str) -> String {
    format!(
        "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n\n{prompt}<|eot_id|>\
         <|start_header_id|>assistant<|end_header_id|>\n\n"
    )
}

/// JSON body of a Llama 3 `InvokeModel` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlamaRequest {
    /// Templated prompt.
    pub prompt: String,
    /// Maximum generated tokens.
    pub max_gen_len: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl LlamaRequest {
    /// Build a request for a raw user prompt.
    pub fn new(prompt: &str, max_gen_len: u32, temperature: f32) -> Self {
        Self {
            prompt: llama3_prompt(prompt),
            max_gen_len,
            temperature,
        }
    }
}

/// JSON body of a Llama 3 `InvokeModel` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LlamaResponse {
    /// Generated text.
    #[serde(default)]
    pub generation: String,
    /// Why generation stopped (`stop`, `length`).
    #[serde(default)]
    pub stop_reason: Option<String>,
}
