//! Worker lock and rate window commands.

use clap::{Args, Subcommand};
use dialoguer::Confirm;

use genqueue_core::error::AppError;
use genqueue_worker::{RateLimiter, WorkerLock};

use crate::output::{self, OutputFormat};

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Show lock holder and rate window usage
    Status,
    /// Delete the worker lock regardless of holder
    ReleaseLock {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute worker commands
pub async fn execute(
    args: &WorkerArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::connect_store(&config).await?;
    let lock = WorkerLock::new(store.clone(), &config.worker.lock);

    match &args.command {
        WorkerCommand::Status => {
            let limiter = RateLimiter::new(store, &config.worker.rate_limit);
            let holder = lock.holder().await?;
            let used = limiter.current_count().await?;
            match format {
                OutputFormat::Json => output::print_item(
                    &serde_json::json!({
                        "lock_holder": holder,
                        "lock_ttl_seconds": lock.ttl().as_secs(),
                        "window_used": used,
                        "window_limit": limiter.max_requests(),
                        "window_seconds": config.worker.rate_limit.window_seconds,
                    }),
                    format,
                ),
                OutputFormat::Table => {
                    println!("Worker Status:");
                    output::print_kv("Lock holder", holder.as_deref().unwrap_or("free"));
                    output::print_kv("Lock TTL", &format!("{}s", lock.ttl().as_secs()));
                    output::print_kv(
                        "Rate window",
                        &format!(
                            "{used}/{} in {}s",
                            limiter.max_requests(),
                            config.worker.rate_limit.window_seconds
                        ),
                    );
                }
            }
        }
        WorkerCommand::ReleaseLock { yes } => {
            let Some(holder) = lock.holder().await? else {
                output::print_success("Worker lock is already free");
                return Ok(());
            };
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Release lock held by {holder}? A live worker will keep running unlocked"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
                if !confirmed {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }
            lock.force_release().await?;
            output::print_success("Worker lock released");
        }
    }

    Ok(())
}
