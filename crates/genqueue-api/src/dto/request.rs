//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

/// Enqueue request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnqueueRequest {
    /// Prompt text.
    #[validate(length(min = 1, message = "Prompt must not be empty"))]
    pub prompt: String,
    /// Environment token. Anything other than `PROD` resolves to UAT.
    #[serde(default)]
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_is_optional() {
        let req: EnqueueRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(req.environment, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let req: EnqueueRequest =
            serde_json::from_str(r#"{"prompt":"","environment":"UAT"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
