//! # genqueue-entity
//!
//! Domain entity models for GenQueue: the job record kept in the shared
//! store and the generated-text row persisted in the result database.

pub mod generated;
pub mod job;
