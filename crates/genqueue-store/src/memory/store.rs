//! In-memory shared store.
//!
//! Coordinates only the tasks of a single process. Lists share one mutex so
//! moves between lists are atomic; strings and hashes use `dashmap` entries.
//! Expiry is evaluated lazily against `tokio::time::Instant`, which lets tests
//! drive lock TTLs with a paused clock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use genqueue_core::config::MemoryStoreConfig;
use genqueue_core::result::AppResult;
use genqueue_core::traits::store::SharedStore;

#[derive(Debug, Clone)]
struct Expiring {
    value: String,
    expires_at: Option<Instant>,
}

impl Expiring {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory store provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Prefix applied to every key.
    prefix: String,
    /// All lists, behind one lock.
    lists: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    /// Hashes.
    hashes: Arc<DashMap<String, HashMap<String, String>>>,
    /// String values with optional expiry.
    strings: Arc<DashMap<String, Expiring>>,
    /// Sliding windows, oldest entry first.
    windows: Arc<DashMap<String, VecDeque<(i64, String)>>>,
}

impl MemoryStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self {
            prefix: config.key_prefix.clone(),
            ..Self::default()
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn push_back(&self, list: &str, value: &str) -> AppResult<u64> {
        let mut lists = self.lists.lock().await;
        let entries = lists.entry(self.key(list)).or_default();
        entries.push_back(value.to_string());
        Ok(entries.len() as u64)
    }

    async fn move_front_to_back(
        &self,
        source: &str,
        destination: &str,
    ) -> AppResult<Option<String>> {
        let mut lists = self.lists.lock().await;
        let Some(value) = lists.get_mut(&self.key(source)).and_then(VecDeque::pop_front) else {
            return Ok(None);
        };
        lists
            .entry(self.key(destination))
            .or_default()
            .push_back(value.clone());
        Ok(Some(value))
    }

    async fn remove_from_list(&self, list: &str, value: &str) -> AppResult<u64> {
        let mut lists = self.lists.lock().await;
        let Some(entries) = lists.get_mut(&self.key(list)) else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|v| v != value);
        Ok((before - entries.len()) as u64)
    }

    async fn list_len(&self, list: &str) -> AppResult<u64> {
        let lists = self.lists.lock().await;
        Ok(lists.get(&self.key(list)).map_or(0, |l| l.len() as u64))
    }

    async fn list_range(&self, list: &str) -> AppResult<Vec<String>> {
        let lists = self.lists.lock().await;
        Ok(lists
            .get(&self.key(list))
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> AppResult<()> {
        let mut hash = self.hashes.entry(self.key(key)).or_default();
        for (field, value) in fields {
            hash.insert((*field).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        Ok(self
            .hashes
            .get(&self.key(key))
            .and_then(|h| h.get(field).cloned()))
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        Ok(self
            .hashes
            .get(&self.key(key))
            .map(|h| h.clone())
            .unwrap_or_default())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        Ok(self
            .strings
            .get(&self.key(key))
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let fresh = Expiring {
            value: value.to_string(),
            expires_at: Some(now + ttl),
        };
        match self.strings.entry(self.key(key)) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                trace!(key, "Replacing expired key");
                occupied.insert(fresh);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> AppResult<bool> {
        let now = Instant::now();
        let removed = self
            .strings
            .remove_if(&self.key(key), |_, e| e.is_live(now) && e.value == expected);
        Ok(removed.is_some())
    }

    async fn expire_if_equals(&self, key: &str, expected: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        match self.strings.get_mut(&self.key(key)) {
            Some(mut entry) if entry.is_live(now) && entry.value == expected => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.key(key);
        self.strings.remove(&full_key);
        self.hashes.remove(&full_key);
        self.windows.remove(&full_key);
        self.lists.lock().await.remove(&full_key);
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
        let floor = now_ms - window.as_millis() as i64;
        let mut entries = self.windows.entry(self.key(key)).or_default();
        entries.retain(|(ts, _)| *ts > floor);
        if entries.len() >= limit as usize {
            return Ok(false);
        }
        entries.push_back((now_ms, member.to_string()));
        while entries.len() > limit as usize {
            entries.pop_front();
        }
        Ok(true)
    }

    async fn window_count(&self, key: &str, now_ms: i64, window: Duration) -> AppResult<u64> {
        let floor = now_ms - window.as_millis() as i64;
        Ok(self
            .windows
            .get(&self.key(key))
            .map_or(0, |w| w.iter().filter(|(ts, _)| *ts > floor).count() as u64))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
