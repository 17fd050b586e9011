//! # genqueue-core
//!
//! Core crate for GenQueue. Contains the configuration schema, typed
//! identifiers, the environment/namespace mapping, the collaborator traits
//! implemented by the store, database and inference crates, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other GenQueue crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
