//! Shared store trait for cross-process queue coordination.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Backend holding the queue, job records, the rate window and the worker lock.
///
/// Every method is a single atomic operation against the store. Callers never
/// compose multi-step transactions; where the coordinator needs a
/// read-modify-write (rate window, lock renewal) the backend provides it as
/// one primitive. The provider is responsible for key prefixing.
#[async_trait]
pub trait SharedStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a value to the tail of a list. Returns the new list length.
    async fn push_back(&self, list: &str, value: &str) -> AppResult<u64>;

    /// Atomically pop the head of `source` and append it to the tail of
    /// `destination`. Returns the moved value, or `None` if `source` was empty.
    async fn move_front_to_back(&self, source: &str, destination: &str)
    -> AppResult<Option<String>>;

    /// Remove every occurrence of `value` from a list. Returns how many were removed.
    async fn remove_from_list(&self, list: &str, value: &str) -> AppResult<u64>;

    /// Number of elements in a list (0 if it does not exist).
    async fn list_len(&self, list: &str) -> AppResult<u64>;

    /// All elements of a list, head first.
    async fn list_range(&self, list: &str) -> AppResult<Vec<String>>;

    /// Set one or more fields of a hash.
    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> AppResult<()>;

    /// Read one field of a hash.
    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>>;

    /// Read every field of a hash. Empty if the hash does not exist.
    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>>;

    /// Get a string value by key. Returns `None` if missing or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value only if the key does not already exist (NX) with a TTL.
    /// Returns `true` if the value was set, `false` if the key already existed.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete `key` only if it currently holds `expected`.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> AppResult<bool>;

    /// Reset the TTL of `key` only if it currently holds `expected`.
    async fn expire_if_equals(&self, key: &str, expected: &str, ttl: Duration) -> AppResult<bool>;

    /// Unconditionally delete a key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Sliding-window admission in one atomic step.
    ///
    /// Drops entries of the window at `key` older than `now_ms - window`,
    /// and if fewer than `limit` remain records `member` at `now_ms`, trims
    /// the window to the `limit` newest entries and returns `true`.
    /// Otherwise leaves the window untouched and returns `false`.
    async fn admit_in_window(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> AppResult<bool>;

    /// Number of entries of the window at `key` newer than `now_ms - window`.
    async fn window_count(&self, key: &str, now_ms: i64, window: Duration) -> AppResult<u64>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
