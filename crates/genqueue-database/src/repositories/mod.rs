//! Repository implementations.

pub mod generated_text;

pub use generated_text::GeneratedTextRepository;
