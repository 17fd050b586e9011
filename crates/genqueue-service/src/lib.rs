//! # genqueue-service
//!
//! Application service layer for GenQueue. Services are the only callers of
//! the worker coordinator and result store from the HTTP and CLI surfaces.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time.

pub mod health;
pub mod prompt;

#[cfg(test)]
mod testing;

pub use health::{HealthReport, HealthService};
pub use prompt::{EnqueuedJob, JobView, PromptService, QueueOverview};
