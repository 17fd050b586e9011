//! In-memory collaborators for service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use genqueue_core::config::{EnvironmentsConfig, MemoryStoreConfig, WorkerConfig};
use genqueue_core::result::AppResult;
use genqueue_core::traits::inference::{InferenceError, InferenceProvider};
use genqueue_core::traits::results::{ResultRecord, ResultStore, StoredResult};
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::{GeneratedTextId, JobId, Namespace};
use genqueue_inference::InferenceClient;
use genqueue_store::memory::MemoryStore;
use genqueue_worker::WorkerCoordinator;

use crate::prompt::PromptService;

#[derive(Debug, Default)]
struct EchoProvider {
    delay: Option<Duration>,
}

#[async_trait]
impl InferenceProvider for EchoProvider {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, InferenceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("{model}: {prompt}"))
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryResults {
    rows: Mutex<Vec<(Namespace, StoredResult)>>,
}

#[async_trait]
impl ResultStore for MemoryResults {
    async fn save(
        &self,
        namespace: &Namespace,
        record: &ResultRecord,
    ) -> AppResult<GeneratedTextId> {
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

pub(crate) struct TestContext {
    pub(crate) store: Arc<dyn SharedStore>,
    pub(crate) results: Arc<MemoryResults>,
    pub(crate) coordinator: WorkerCoordinator,
    pub(crate) max_prompt_chars: usize,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Self::build(EchoProvider::default())
    }

    pub(crate) fn with_slow_inference(delay: Duration) -> Self {
        Self::build(EchoProvider { delay: Some(delay) })
    }

    fn build(provider: EchoProvider) -> Self {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new(&MemoryStoreConfig::default()));
        let results = Arc::new(MemoryResults::default());
        let coordinator = WorkerCoordinator::build(
            Arc::clone(&store),
            results.clone(),
            InferenceClient::new(Arc::new(provider), "primary", "fallback"),
            &WorkerConfig::default(),
            Namespace::new("SSP-dev"),
        );
        Self {
            store,
            results,
            coordinator,
            max_prompt_chars: 100,
        }
    }

    pub(crate) fn prompt_service(&self) -> PromptService {
        PromptService::new(
            self.coordinator.clone(),
            self.results.clone(),
            EnvironmentsConfig::default(),
            self.max_prompt_chars,
        )
    }

    /// Yield until no worker holds the lock and nothing is queued.
    pub(crate) async fn wait_idle(&self) {
        loop {
            let stats = self.coordinator.queue().stats().await.unwrap();
            let running = self.coordinator.is_running().await.unwrap();
            if !running && stats.queued == 0 && stats.in_flight == 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}
