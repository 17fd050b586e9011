//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use genqueue_api::{AppState, build_router};
use genqueue_core::config::{AppConfig, MemoryStoreConfig};
use genqueue_core::result::AppResult;
use genqueue_core::traits::inference::{InferenceError, InferenceProvider};
use genqueue_core::traits::results::{ResultRecord, ResultStore, StoredResult};
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::{Environment, GeneratedTextId, JobId, Namespace};
use genqueue_inference::InferenceClient;
use genqueue_service::{HealthService, PromptService};
use genqueue_store::memory::MemoryStore;
use genqueue_worker::WorkerCoordinator;

/// Longest prompt the test app accepts.
pub const MAX_PROMPT_CHARS: u64 = 200;

/// Provider that answers `"<model>: <prompt>"`, optionally failing the
/// primary model.
#[derive(Debug, Default)]
pub struct EchoProvider {
    pub fail_primary: bool,
}

#[async_trait]
impl InferenceProvider for EchoProvider {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, InferenceError> {
        if self.fail_primary && model == "primary" {
            return Err(InferenceError::Transient("throttled".to_string()));
        }
        Ok(format!("{model}: {prompt}"))
    }
}

/// Result store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryResults {
    rows: Mutex<Vec<(Namespace, StoredResult)>>,
    healthy: Option<bool>,
}

impl MemoryResults {
    /// A store whose health probe reports unreachable.
    pub fn unreachable() -> Self {
        Self {
            healthy: Some(false),
            ..Self::default()
        }
    }

    /// Rows written to `namespace`.
    pub fn count_in(&self, namespace: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(ns, _)| ns.as_str() == namespace)
            .count()
    }

    /// Total rows written.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ResultStore for MemoryResults {
    async fn save(&self, namespace: &Namespace, record: &ResultRecord) -> AppResult<GeneratedTextId> {
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
        Ok(self.healthy.unwrap_or(true))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared store behind the queue
    pub store: Arc<dyn SharedStore>,
    /// Persisted results
    pub results: Arc<MemoryResults>,
    /// Worker coordinator
    pub coordinator: WorkerCoordinator,
}

impl TestApp {
    /// Create a new test application over in-memory backends
    pub fn new() -> Self {
        Self::build(EchoProvider::default(), MemoryResults::default())
    }

    /// Test application whose primary model always fails
    pub fn with_failing_primary() -> Self {
        Self::build(EchoProvider { fail_primary: true }, MemoryResults::default())
    }

    /// Test application whose database probe fails
    pub fn with_unreachable_database() -> Self {
        Self::build(EchoProvider::default(), MemoryResults::unreachable())
    }

    fn build(provider: EchoProvider, results: MemoryResults) -> Self {
        let mut config = AppConfig::default();
        config.store.provider = "memory".to_string();
        config.server.max_prompt_chars = MAX_PROMPT_CHARS;
        config.worker.requeue_backoff_seconds = 0;

        let store: Arc<dyn SharedStore> =
            Arc::new(MemoryStore::new(&MemoryStoreConfig::default()));
        let results = Arc::new(results);
        let inference = InferenceClient::new(Arc::new(provider), "primary", "fallback");

        let coordinator = WorkerCoordinator::build(
            Arc::clone(&store),
            results.clone(),
            inference,
            &config.worker,
            Environment::Uat.namespace(&config.environments),
        );

        let prompt_service = Arc::new(PromptService::new(
            coordinator.clone(),
            results.clone(),
            config.environments.clone(),
            config.server.max_prompt_chars as usize,
        ));
        let health_service = Arc::new(HealthService::new(Arc::clone(&store), results.clone()));

        let state = AppState {
            config: Arc::new(config),
            prompt_service,
            health_service,
        };

        Self {
            router: build_router(state),
            store,
            results,
            coordinator,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str).await
    }

    /// Make an HTTP request with a literal body
    pub async fn raw_request(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Enqueue a prompt and return its job id
    pub async fn enqueue(&self, prompt: &str, environment: &str) -> String {
        let response = self
            .request(
                "POST",
                "/enqueue",
                Some(serde_json::json!({ "prompt": prompt, "environment": environment })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["job_id"]
            .as_str()
            .expect("job_id missing")
            .to_string()
    }

    /// Wait until the worker is idle and the queue is drained
    pub async fn wait_idle(&self) {
        let drained = async {
            loop {
                let stats = self.coordinator.queue().stats().await.unwrap();
                let running = self.coordinator.is_running().await.unwrap();
                if !running && stats.queued == 0 && stats.in_flight == 0 {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), drained)
            .await
            .expect("queue did not drain");
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
