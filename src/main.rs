//! GenQueue Server: rate-limited text generation queue.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use genqueue_api::{AppState, build_router};
use genqueue_core::config::AppConfig;
use genqueue_core::error::AppError;
use genqueue_core::traits::results::ResultStore;
use genqueue_core::types::Environment;
use genqueue_database::migration::provision_namespaces;
use genqueue_database::{DatabasePool, GeneratedTextRepository};
use genqueue_inference::InferenceClient;
use genqueue_inference::providers::bedrock::BedrockProvider;
use genqueue_service::{HealthService, PromptService};
use genqueue_store::StoreManager;
use genqueue_worker::{Supervisor, WorkerCoordinator};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("GENQUEUE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting GenQueue v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Shared store ─────────────────────────────────────
    tracing::info!(provider = %config.store.provider, "Initializing shared store...");
    let store = StoreManager::new(&config.store).await?.shared();

    // ── Step 2: Result database + namespaces ─────────────────────
    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?;
    let namespaces = [
        Environment::Uat.namespace(&config.environments),
        Environment::Prod.namespace(&config.environments),
    ];
    provision_namespaces(db_pool.pool(), &namespaces).await?;
    let results: Arc<dyn ResultStore> =
        Arc::new(GeneratedTextRepository::new(db_pool.pool().clone()));

    // ── Step 3: Inference client ─────────────────────────────────
    tracing::info!(
        region = %config.inference.region,
        primary = %config.inference.primary_model,
        fallback = %config.inference.fallback_model,
        "Initializing inference client..."
    );
    let provider = Arc::new(BedrockProvider::new(&config.inference).await);
    let inference = InferenceClient::from_config(provider, &config.inference);

    // ── Step 4: Worker + supervisor ──────────────────────────────
    let coordinator = WorkerCoordinator::build(
        Arc::clone(&store),
        Arc::clone(&results),
        inference,
        &config.worker,
        namespaces[0].clone(),
    );

    let mut supervisor = Supervisor::new(coordinator.clone()).await?;
    supervisor.register(&config.worker.supervisor_schedule).await?;
    supervisor.start().await?;

    // Jobs left over from a previous run.
    if coordinator.ensure_running().await? {
        tracing::info!("Worker started for pending jobs");
    }

    // ── Step 5: Services + router ────────────────────────────────
    let prompt_service = Arc::new(PromptService::new(
        coordinator.clone(),
        Arc::clone(&results),
        config.environments.clone(),
        config.server.max_prompt_chars as usize,
    ));
    let health_service = Arc::new(HealthService::new(store, results));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState {
        config: Arc::new(config),
        prompt_service,
        health_service,
    };
    let app = build_router(state);

    // ── Step 6: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("GenQueue listening on {addr}");

    axum_serve(listener, app).await?;

    // ── Step 7: Graceful shutdown ────────────────────────────────
    tracing::info!("Stopping supervisor...");
    supervisor.shutdown().await?;

    // A drain still in flight keeps its lock until it finishes or the
    // TTL lapses; the next start reconciles whatever it left behind.
    if coordinator.is_running().await.unwrap_or(false) {
        tracing::info!(grace_seconds = grace.as_secs(), "Waiting for worker to finish...");
        let deadline = tokio::time::Instant::now() + grace;
        while tokio::time::Instant::now() < deadline
            && coordinator.is_running().await.unwrap_or(false)
        {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    db_pool.close().await;
    tracing::info!("GenQueue shut down");
    Ok(())
}

async fn axum_serve(listener: tokio::net::TcpListener, app: axum::Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
