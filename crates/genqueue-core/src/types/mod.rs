//! Core type definitions used across the GenQueue workspace.

pub mod environment;
pub mod id;

pub use environment::{Environment, Namespace};
pub use id::*;
