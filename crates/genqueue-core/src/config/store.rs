//! Shared queue store configuration.

use serde::{Deserialize, Serialize};

/// Top-level shared store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider type: `"redis"` or `"memory"`.
    ///
    /// `memory` only coordinates workers inside one process and exists for
    /// local development and tests.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisStoreConfig,
    /// In-memory store configuration.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisStoreConfig::default(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

/// Redis store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Optional password, injected into the URL when the URL carries none.
    #[serde(default)]
    pub password: Option<String>,
    /// Key prefix for all GenQueue keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            password: None,
            key_prefix: default_key_prefix(),
        }
    }
}

impl RedisStoreConfig {
    /// The connection URL with the configured password applied.
    pub fn connection_url(&self) -> String {
        let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) else {
            return self.url.clone();
        };

        let Some(scheme_end) = self.url.find("://").map(|p| p + 3) else {
            return self.url.clone();
        };

        if self.url[scheme_end..].contains('@') {
            return self.url.clone();
        }

        format!(
            "{}:{}@{}",
            &self.url[..scheme_end],
            password,
            &self.url[scheme_end..]
        )
    }
}

/// In-memory store backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Key prefix, kept symmetric with the Redis backend.
    #[serde(default)]
    pub key_prefix: String,
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "genqueue:".to_string()
}
