//! # docreg-database
//!
//! Persistence for DocReg: the store traits the service layer is written
//! against, their PostgreSQL implementations, and an in-memory store that
//! enforces the same uniqueness rules.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use store::{
    ArtifactStore, CategoryStore, DocumentStore, GroupStore, SequenceStore, StoreSet,
    TemplateStore,
};
