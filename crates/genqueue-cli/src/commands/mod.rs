//! CLI command definitions and dispatch.

pub mod config;
pub mod job;
pub mod queue;
pub mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use genqueue_core::config::AppConfig;
use genqueue_core::error::AppError;
use genqueue_core::traits::store::SharedStore;
use genqueue_core::types::Environment;
use genqueue_store::StoreManager;
use genqueue_worker::JobQueue;

use crate::output::OutputFormat;

/// GenQueue: rate-limited text generation queue
#[derive(Debug, Parser)]
#[command(name = "genqueue", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Queue inspection and recovery
    Queue(queue::QueueArgs),
    /// Job submission and lookup
    Job(job::JobArgs),
    /// Worker lock and rate window
    Worker(worker::WorkerArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Queue(args) => queue::execute(args, &self.config, self.format).await,
            Commands::Job(args) => job::execute(args, &self.config, self.format).await,
            Commands::Worker(args) => worker::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Helper: connect to the configured shared store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn SharedStore>, AppError> {
    let manager = StoreManager::new(&config.store).await?;
    Ok(manager.shared())
}

/// Helper: queue handle over the configured store
pub async fn open_queue(config: &AppConfig) -> Result<JobQueue, AppError> {
    let store = connect_store(config).await?;
    Ok(queue_over(config, store))
}

/// Helper: queue handle over an existing store connection
pub fn queue_over(config: &AppConfig, store: Arc<dyn SharedStore>) -> JobQueue {
    JobQueue::new(store, Environment::Uat.namespace(&config.environments))
}

/// Reject prompts the enqueue endpoint would reject.
pub fn check_prompt(prompt: &str, max_chars: u64) -> Result<(), AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::validation("Prompt must not be empty"));
    }
    let chars = prompt.chars().count() as u64;
    if chars > max_chars {
        return Err(AppError::validation(format!(
            "Prompt is {chars} characters; the maximum is {max_chars}"
        )));
    }
    Ok(())
}
