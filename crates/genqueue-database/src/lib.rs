//! # genqueue-database
//!
//! PostgreSQL connection management, per-namespace schema provisioning and
//! the repository that persists generated text.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::GeneratedTextRepository;
