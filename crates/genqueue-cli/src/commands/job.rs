//! Job submission and lookup commands.

use clap::{Args, Subcommand};

use genqueue_core::error::AppError;
use genqueue_core::traits::results::ResultStore;
use genqueue_core::types::{Environment, JobId};
use genqueue_database::{DatabasePool, GeneratedTextRepository};
use genqueue_entity::job::Job;

use crate::output::{self, OutputFormat};

/// Arguments for job commands
#[derive(Debug, Args)]
pub struct JobArgs {
    /// Job subcommand
    #[command(subcommand)]
    pub command: JobCommand,
}

/// Job subcommands
#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Queue a prompt; a running server's supervisor picks it up
    Enqueue {
        /// Prompt text
        prompt: String,
        /// Environment token (UAT or PROD)
        #[arg(short, long, default_value = "UAT")]
        environment: String,
    },
    /// Show a job record
    Show {
        /// Job id
        id: String,
    },
    /// Print the persisted result of a completed job
    Result {
        /// Job id
        id: String,
    },
}

/// Execute job commands
pub async fn execute(
    args: &JobArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let queue = super::open_queue(&config).await?;

    match &args.command {
        JobCommand::Enqueue {
            prompt,
            environment,
        } => {
            super::check_prompt(prompt, config.server.max_prompt_chars)?;
            let environment = Environment::from_token(environment);
            let namespace = environment.namespace(&config.environments);
            let job = Job::queued(prompt.as_str(), environment, namespace);
            queue.enqueue(&job).await?;
            output::print_success(&format!(
                "Job {} queued for {} ({})",
                job.id, job.environment, job.namespace
            ));
        }
        JobCommand::Show { id } => {
            let job = queue
                .load(parse_id(id)?)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
            output::print_item(&job, format);
        }
        JobCommand::Result { id } => {
            let job_id = parse_id(id)?;
            let job = queue
                .load(job_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;

            let pool = DatabasePool::connect(&config.database).await?;
            let repo = GeneratedTextRepository::new(pool.pool().clone());
            let stored = repo.find_by_job(&job.namespace, job_id).await?;
            pool.close().await;

            match stored {
                Some(row) => output::print_item(&row, format),
                None => output::print_warning(&format!(
                    "No result in {} for job {id} (status: {})",
                    job.namespace,
                    job.status.as_str()
                )),
            }
        }
    }

    Ok(())
}

fn parse_id(id: &str) -> Result<JobId, AppError> {
    id.parse()
        .map_err(|_| AppError::validation(format!("Invalid job id: {id}")))
}
