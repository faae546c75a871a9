//! # docreg-storage
//!
//! Blob storage providers for DocReg. Generated PDFs, uploaded attachments,
//! and layout files all live behind [`StorageProvider`], addressed by
//! slash-separated relative paths.

pub mod factory;
pub mod providers;

pub use docreg_core::traits::storage::StorageProvider;
pub use factory::build_provider;
pub use providers::{LocalStorageProvider, MemoryStorageProvider};
