//! Store manager that dispatches to the configured backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use genqueue_core::config::StoreConfig;
use genqueue_core::error::AppError;
use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;

/// Store manager that wraps the configured shared store backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner backend.
    inner: Arc<dyn SharedStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn SharedStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store");
                Arc::new(crate::memory::MemoryStore::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn SharedStore>) -> Self {
        Self { inner: store }
    }

    /// Shared handle to the inner backend.
    pub fn shared(&self) -> Arc<dyn SharedStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl SharedStore for StoreManager {
    async fn push_back(&self, list: &str, value: &str) -> AppResult<u64> {
        self.inner.push_back(list, value).await
    }

    async fn move_front_to_back(
        &self,
        source: &str,
        destination: &str,
    ) -> AppResult<Option<String>> {
        self.inner.move_front_to_back(source, destination).await
    }

    async fn remove_from_list(&self, list: &str, value: &str) -> AppResult<u64> {
        self.inner.remove_from_list(list, value).await
    }

    async fn list_len(&self, list: &str) -> AppResult<u64> {
        self.inner.list_len(list).await
    }

    async fn list_range(&self, list: &str) -> AppResult<Vec<String>> {
        self.inner.list_range(list).await
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> AppResult<()> {
        self.inner.hash_set(key, fields).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        self.inner.hash_get(key, field).await
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        self.inner.hash_get_all(key).await
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> AppResult<bool> {
        self.inner.delete_if_equals(key, expected).await
    }

    async fn expire_if_equals(&self, key: &str, expected: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire_if_equals(key, expected, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn admit_in_window(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> AppResult<bool> {
        self.inner
            .admit_in_window(key, member, now_ms, window, limit)
            .await
    }

    async fn window_count(&self, key: &str, now_ms: i64, window: Duration) -> AppResult<u64> {
        self.inner.window_count(key, now_ms, window).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
