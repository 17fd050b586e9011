//! Convenience result type alias for GenQueue.

use crate::error::AppError;

/// A specialized `Result` type for GenQueue operations.
pub type AppResult<T> = Result<T, AppError>;
