//! Redis shared store implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use genqueue_core::error::{AppError, ErrorKind};
use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;

use super::client::RedisClient;
use super::scripts;

/// Redis-backed shared store.
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn push_back(&self, list: &str, value: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(list);
        let mut conn = self.client.conn_mut();
        let len: u64 = conn.rpush(&full_key, value).await.map_err(Self::map_err)?;
        Ok(len)
    }

    async fn move_front_to_back(
        &self,
        source: &str,
        destination: &str,
    ) -> AppResult<Option<String>> {
        let src = self.client.prefixed_key(source);
        let dst = self.client.prefixed_key(destination);
        let mut conn = self.client.conn_mut();

        // LMOVE src dst LEFT RIGHT
        let moved: Option<String> = redis::cmd("LMOVE")
            .arg(&src)
            .arg(&dst)
            .arg("LEFT")
            .arg("RIGHT")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(moved)
    }

    async fn remove_from_list(&self, list: &str, value: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(list);
        let mut conn = self.client.conn_mut();
        let removed: u64 = conn
            .lrem(&full_key, 0, value)
            .await
            .map_err(Self::map_err)?;
        Ok(removed)
    }

    async fn list_len(&self, list: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(list);
        let mut conn = self.client.conn_mut();
        let len: u64 = conn.llen(&full_key).await.map_err(Self::map_err)?;
        Ok(len)
    }

    async fn list_range(&self, list: &str) -> AppResult<Vec<String>> {
        let full_key = self.client.prefixed_key(list);
        let mut conn = self.client.conn_mut();
        let items: Vec<String> = conn
            .lrange(&full_key, 0, -1)
            .await
            .map_err(Self::map_err)?;
        Ok(items)
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .hset_multiple(&full_key, fields)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let value: Option<String> = conn.hget(&full_key, field).await.map_err(Self::map_err)?;
        Ok(value)
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let map: HashMap<String, String> =
            conn.hgetall(&full_key).await.map_err(Self::map_err)?;
        Ok(map)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value PX ttl NX
        let result: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let deleted: i64 = scripts::DELETE_IF_EQUALS
            .key(&full_key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(deleted == 1)
    }

    async fn expire_if_equals(&self, key: &str, expected: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let renewed: i64 = scripts::EXPIRE_IF_EQUALS
            .key(&full_key)
            .arg(expected)
            .arg(ttl.as_millis() as u64)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(renewed == 1)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn admit_in_window(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let admitted: i64 = scripts::ADMIT_IN_WINDOW
            .key(&full_key)
            .arg(now_ms)
            .arg(window.as_millis() as u64)
            .arg(limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(admitted == 1)
    }

    async fn window_count(&self, key: &str, now_ms: i64, window: Duration) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let floor = format!("({}", now_ms - window.as_millis() as i64);
        let count: u64 = conn
            .zcount(&full_key, floor, "+inf")
            .await
            .map_err(Self::map_err)?;
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
