//! # genqueue-store
//!
//! Shared store backends for GenQueue. The store holds the prompt queue,
//! the in-flight list, job records, the rate window and the worker lock.
//!
//! - **redis**: the production backend, shared by every process
//! - **memory**: a single-process backend for development and tests
//!
//! The backend is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
