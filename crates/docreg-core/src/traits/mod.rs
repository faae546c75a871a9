//! Collaborator traits defined in `docreg-core` and implemented by other crates.

pub mod pdf;
pub mod storage;

pub use pdf::PdfRenderer;
pub use storage::StorageProvider;
