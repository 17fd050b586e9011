//! Collaborator traits defined in `genqueue-core` and implemented by other crates.

pub mod inference;
pub mod results;
pub mod store;

pub use inference::{InferenceError, InferenceProvider};
pub use results::{ResultRecord, ResultStore, StoredResult};
pub use store::SharedStore;
