//! Generated-text result entities.

pub mod model;

pub use model::GeneratedText;
