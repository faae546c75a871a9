//! Convenience result type alias for DocReg.

use crate::error::AppError;

/// A specialized `Result` type for DocReg operations.
pub type AppResult<T> = Result<T, AppError>;
