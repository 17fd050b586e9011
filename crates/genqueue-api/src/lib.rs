//! # genqueue-api
//!
//! HTTP API layer for GenQueue built on Axum.
//!
//! Provides the enqueue and job lookup endpoints, queue and health probes,
//! middleware (CORS, request logging), extractors, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
