//! Queue inspection and recovery commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use genqueue_core::error::AppError;
use genqueue_core::types::JobId;
use genqueue_worker::{JobQueue, WorkerLock};

use crate::output::{self, OutputFormat};

/// Arguments for queue commands
#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Queue subcommand
    #[command(subcommand)]
    pub command: QueueCommand,
}

/// Queue subcommands
#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Show queue depth and worker state
    Status,
    /// List queued and in-flight jobs
    List,
    /// Move orphaned in-flight jobs back onto the queue
    Reconcile,
}

/// One row of `queue list`.
#[derive(Debug, Serialize, Tabled)]
struct QueueRow {
    #[tabled(rename = "Job ID")]
    id: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Execute queue commands
pub async fn execute(
    args: &QueueArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::connect_store(&config).await?;
    let queue = super::queue_over(&config, store.clone());
    let lock = WorkerLock::new(store, &config.worker.lock);

    match &args.command {
        QueueCommand::Status => {
            let stats = queue.stats().await?;
            let holder = lock.holder().await?;
            match format {
                OutputFormat::Json => output::print_item(
                    &serde_json::json!({
                        "queued": stats.queued,
                        "in_flight": stats.in_flight,
                        "lock_holder": holder,
                    }),
                    format,
                ),
                OutputFormat::Table => {
                    println!("Queue Status:");
                    output::print_kv("Queued", &stats.queued.to_string());
                    output::print_kv("In flight", &stats.in_flight.to_string());
                    output::print_kv("Worker lock", holder.as_deref().unwrap_or("free"));
                }
            }
        }
        QueueCommand::List => {
            let mut rows = Vec::new();
            for id in queue.in_flight_ids().await? {
                rows.push(row(&queue, id, "in flight".to_string()).await?);
            }
            for (i, id) in queue.queued_ids().await?.into_iter().enumerate() {
                rows.push(row(&queue, id, (i + 1).to_string()).await?);
            }
            output::print_list(&rows, format);
        }
        QueueCommand::Reconcile => {
            // Sweeping while a worker runs would requeue its current job.
            let Some(token) = lock.try_acquire().await? else {
                return Err(AppError::conflict(
                    "A worker holds the lock; it reconciles on its own",
                ));
            };
            let result = queue.reconcile().await;
            lock.release(&token).await?;
            let report = result?;

            output::print_success(&format!(
                "Reconciled: {} requeued, {} dropped",
                report.requeued, report.dropped
            ));
        }
    }

    Ok(())
}

async fn row(queue: &JobQueue, id: JobId, position: String) -> Result<QueueRow, AppError> {
    let job = queue.load(id).await?;
    Ok(QueueRow {
        id: id.to_string(),
        position,
        status: job
            .as_ref()
            .map_or("missing", |j| j.status.as_str())
            .to_string(),
        environment: job
            .as_ref()
            .map_or("-", |j| j.environment.as_str())
            .to_string(),
        created_at: job
            .as_ref()
            .map(|j| j.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string()),
    })
}
