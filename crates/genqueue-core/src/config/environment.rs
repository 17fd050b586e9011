//! Environment token to result namespace mapping.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Result-store namespaces for the two recognised environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
    /// Namespace for `UAT` jobs and for unrecognised tokens.
    #[serde(default = "default_uat")]
    pub uat_namespace: String,
    /// Namespace for `PROD` jobs.
    #[serde(default = "default_prod")]
    pub prod_namespace: String,
}

impl Default for EnvironmentsConfig {
    fn default() -> Self {
        Self {
            uat_namespace: default_uat(),
            prod_namespace: default_prod(),
        }
    }
}

impl EnvironmentsConfig {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        for name in [&self.uat_namespace, &self.prod_namespace] {
            let valid = !name.is_empty()
                && name.len() <= 63
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                return Err(AppError::configuration(format!(
                    "Invalid namespace '{name}': use 1-63 ASCII letters, digits, '_' or '-'"
                )));
            }
        }
        if self.uat_namespace == self.prod_namespace {
            return Err(AppError::configuration(
                "UAT and PROD namespaces must differ",
            ));
        }
        Ok(())
    }
}

fn default_uat() -> String {
    "SSP-dev".to_string()
}

fn default_prod() -> String {
    "SSP-prod".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_quote_in_namespace() {
        let config = EnvironmentsConfig {
            uat_namespace: "dev\"; DROP".to_string(),
            prod_namespace: "prod".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_identical_namespaces() {
        let config = EnvironmentsConfig {
            uat_namespace: "same".to_string(),
            prod_namespace: "same".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
