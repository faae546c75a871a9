//! Storage provider implementations.

pub mod local;
pub mod memory;

pub use local::LocalStorageProvider;
pub use memory::MemoryStorageProvider;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;

/// Reject paths that are empty or escape the storage root.
pub(crate) fn validate_path(path: &str) -> AppResult<&str> {
    let clean = path.trim_start_matches('/');
    if clean.is_empty() {
        return Err(AppError::validation("Storage path must not be empty"));
    }
    if clean.split('/').any(|segment| segment == "..") {
        return Err(AppError::validation(format!(
            "Storage path must not contain '..': {path}"
        )));
    }
    Ok(clean)
}
