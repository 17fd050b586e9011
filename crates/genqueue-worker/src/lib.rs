//! Background processing for GenQueue.
//!
//! This crate provides:
//! - A distributed single-flight lock so one worker loop runs system-wide
//! - A sliding-window rate limiter for inference calls
//! - A reliable queue with an in-flight list and reconciliation sweep
//! - The coordinator that drains the queue and a cron supervisor that
//!   restarts it when work is stranded

pub mod coordinator;
pub mod lock;
pub mod processor;
pub mod queue;
pub mod rate_limiter;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use coordinator::{DrainReport, WorkerCoordinator};
pub use lock::{LockToken, WorkerLock};
pub use processor::{JobProcessor, Step};
pub use queue::{Completion, JobQueue, JobRecord, QueueStats, ReconcileReport};
pub use rate_limiter::RateLimiter;
pub use supervisor::Supervisor;
