//! Prompt submission and job lookup.

pub mod service;

pub use service::{EnqueuedJob, JobView, PromptService, QueueOverview};
