//! Test doubles for worker tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use genqueue_core::config::{LockConfig, MemoryStoreConfig, RateLimitConfig, WorkerConfig};
use genqueue_core::error::AppError;
use genqueue_core::result::AppResult;
use genqueue_core::traits::inference::{InferenceError, InferenceProvider};
use genqueue_core::traits::results::{ResultRecord, ResultStore, StoredResult};
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::{GeneratedTextId, JobId, Namespace};
use genqueue_inference::InferenceClient;
use genqueue_store::memory::MemoryStore;

use crate::coordinator::WorkerCoordinator;

/// Provider answering `"<model>: <prompt>"`, failing for listed models.
#[derive(Debug, Default)]
pub(crate) struct StubProvider {
    failing: Vec<String>,
    panics: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    pub(crate) fn failing(models: &[&str]) -> Self {
        Self {
            failing: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceProvider for StubProvider {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, InferenceError> {
        self.calls.lock().unwrap().push(model.to_string());
        if self.panics {
            panic!("provider exploded");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|m| m == model) {
            return Err(InferenceError::Transient(format!("{model} unavailable")));
        }
        Ok(format!("{model}: {prompt}"))
    }
}

/// In-memory result store.
#[derive(Debug, Default)]
pub(crate) struct MemoryResults {
    rows: Mutex<Vec<(Namespace, StoredResult)>>,
    fail: AtomicBool,
}

impl MemoryResults {
    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn all(&self) -> Vec<(Namespace, StoredResult)> {
        self.rows.lock().unwrap().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ResultStore for MemoryResults {
    async fn save(
        &self,
        namespace: &Namespace,
        record: &ResultRecord,
    ) -> AppResult<GeneratedTextId> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::database("database unavailable"));
        }
        let id = GeneratedTextId::new();
        self.rows.lock().unwrap().push((
            namespace.clone(),
            StoredResult {
                id,
                job_id: record.job_id,
                text: record.text.clone(),
                model: record.model.clone(),
                succeeded: record.succeeded,
                created_at: Utc::now(),
            },
        ));
        Ok(id)
    }

    async fn find_by_job(
        &self,
        namespace: &Namespace,
        job_id: JobId,
    ) -> AppResult<Option<StoredResult>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(ns, row)| ns == namespace && row.job_id == job_id)
            .map(|(_, row)| row.clone()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// A coordinator wired to in-memory collaborators.
pub(crate) struct Harness {
    pub(crate) store: Arc<dyn SharedStore>,
    pub(crate) results: Arc<MemoryResults>,
    pub(crate) provider: Arc<StubProvider>,
    pub(crate) coordinator: WorkerCoordinator,
}

impl Harness {
    pub(crate) fn new(provider: StubProvider) -> Self {
        Self::build(provider, RateLimitConfig::default(), LockConfig::default())
    }

    pub(crate) fn with_limits(provider: StubProvider, rate_limit: RateLimitConfig) -> Self {
        Self::build(provider, rate_limit, LockConfig::default())
    }

    pub(crate) fn with_lock_and_provider(provider: StubProvider, lock: LockConfig) -> Self {
        Self::build(provider, RateLimitConfig::default(), lock)
    }

    fn build(provider: StubProvider, rate_limit: RateLimitConfig, lock: LockConfig) -> Self {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new(&MemoryStoreConfig::default()));
        let results = Arc::new(MemoryResults::default());
        let provider = Arc::new(provider);
        let config = WorkerConfig {
            rate_limit,
            lock,
            ..WorkerConfig::default()
        };
        let coordinator = WorkerCoordinator::build(
            Arc::clone(&store),
            results.clone(),
            InferenceClient::new(provider.clone(), "primary", "fallback"),
            &config,
            Namespace::new("SSP-dev"),
        );
        Self {
            store,
            results,
            provider,
            coordinator,
        }
    }
}
