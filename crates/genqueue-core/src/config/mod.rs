//! Application configuration schemas.
//!
//! Configuration is deserialized via the `config` crate from optional TOML
//! files and `GENQUEUE__`-prefixed environment variables. Each sub-module
//! represents a logical configuration section, and every field carries a
//! default so the server starts with no configuration files at all.

pub mod app;
pub mod database;
pub mod environment;
pub mod inference;
pub mod logging;
pub mod store;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::DatabaseConfig;
pub use self::environment::EnvironmentsConfig;
pub use self::inference::InferenceConfig;
pub use self::logging::LoggingConfig;
pub use self::store::{MemoryStoreConfig, RedisStoreConfig, StoreConfig};
pub use self::worker::{LockConfig, RateLimitConfig, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Shared queue store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Result database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Inference API settings.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Environment token to result namespace mapping.
    #[serde(default)]
    pub environments: EnvironmentsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default`, the environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `GENQUEUE__`
    /// (nested keys separated by `__`). All files are optional.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GENQUEUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single explicit file (used by the CLI).
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("GENQUEUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the worker cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.worker.validate()?;
        self.environments.validate()?;
        if self.inference.primary_model.trim().is_empty() {
            return Err(AppError::configuration(
                "inference.primary_model must not be empty",
            ));
        }
        Ok(())
    }
}
