//! # genqueue-inference
//!
//! Text-generation backends for GenQueue and the primary/fallback failover
//! policy applied to every job.

pub mod client;
pub mod prompt;
pub mod providers;

pub use client::{GenerationOutcome, InferenceClient};
