//! Store traits the service layer is written against.
//!
//! Every trait has a PostgreSQL implementation in [`crate::repositories`]
//! and, with the `memory` feature, an in-process one in [`crate::memory`].
//! Uniqueness rules are enforced by the store at write time:
//!
//! - `(category, group, code)` is unique when `code` is set
//!   ([`ErrorKind::DuplicateCode`](docreg_core::error::ErrorKind::DuplicateCode));
//! - `(category, group, year, sequential)` is unique among managed documents
//!   ([`ErrorKind::SequenceConflict`](docreg_core::error::ErrorKind::SequenceConflict));
//! - a finalized document rejects update, finalize, and delete
//!   ([`ErrorKind::Finalized`](docreg_core::error::ErrorKind::Finalized)).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use docreg_core::result::AppResult;
use docreg_core::types::{CategoryId, DocumentId, GroupId, TemplateId, UserId};
use docreg_entity::artifact::{Artifact, NewArtifact};
use docreg_entity::category::{Category, CreateCategory};
use docreg_entity::document::{Document, NewDocument, SequenceKey};
use docreg_entity::group::{CreateGroup, Group};
use docreg_entity::template::{CreateTemplate, Template};

/// Group persistence.
#[async_trait]
pub trait GroupStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a group by ID.
    async fn find_group(&self, id: GroupId) -> AppResult<Option<Group>>;

    /// List all groups by name.
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    /// Create a group.
    async fn create_group(&self, data: &CreateGroup) -> AppResult<Group>;

    /// Rename a group or change its description.
    async fn update_group(&self, id: GroupId, data: &CreateGroup) -> AppResult<Group>;

    /// Delete a group together with its categories and sequence counters.
    ///
    /// Fails with `Conflict` while any document belongs to the group.
    async fn delete_group(&self, id: GroupId) -> AppResult<()>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a category by ID.
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>>;

    /// List a group's categories by name.
    async fn list_categories(&self, group_id: GroupId) -> AppResult<Vec<Category>>;

    /// Create a category.
    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category>;
}

/// Template persistence.
#[async_trait]
pub trait TemplateStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a template by ID.
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<Template>>;

    /// List all templates by name.
    async fn list_templates(&self) -> AppResult<Vec<Template>>;

    /// Create a template.
    async fn create_template(&self, data: &CreateTemplate) -> AppResult<Template>;
}

/// Document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document by ID.
    async fn find_document(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// List the documents of a (category, group, year) partition, ordered by
    /// sequential and then creation time.
    async fn list_documents(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        year: i32,
    ) -> AppResult<Vec<Document>>;

    /// Distinct years used by a category within a group, newest first.
    async fn list_years(&self, category_id: CategoryId, group_id: GroupId) -> AppResult<Vec<i32>>;

    /// Whether another document of the (category, group) already holds `code`.
    async fn code_exists(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        code: &str,
        excluding: Option<DocumentId>,
    ) -> AppResult<bool>;

    /// Insert a new draft document.
    async fn insert_document(&self, data: &NewDocument) -> AppResult<Document>;

    /// Persist the mutable fields of a draft document.
    async fn update_document(&self, document: &Document) -> AppResult<Document>;

    /// Move a draft document to the final state.
    async fn finalize_document(
        &self,
        id: DocumentId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Document>;

    /// Delete a draft document together with its artifact rows.
    async fn delete_document(&self, id: DocumentId) -> AppResult<()>;
}

/// Atomic per-partition sequential allocation.
#[async_trait]
pub trait SequenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Allocate the next sequential of a partition.
    ///
    /// The first allocation of a partition continues from the highest
    /// sequential already stored in it (or starts at 1).
    async fn next_sequential(&self, key: &SequenceKey) -> AppResult<i32>;
}

/// Artifact persistence.
#[async_trait]
pub trait ArtifactStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document's generated artifact stored at `storage_path`.
    async fn find_generated(
        &self,
        document_id: DocumentId,
        storage_path: &str,
    ) -> AppResult<Option<Artifact>>;

    /// Insert or update the generated artifact keyed by (document, path).
    async fn upsert_generated(&self, data: &NewArtifact) -> AppResult<Artifact>;

    /// Insert an artifact row.
    async fn insert_artifact(&self, data: &NewArtifact) -> AppResult<Artifact>;

    /// List a document's artifacts, oldest first.
    async fn list_artifacts(&self, document_id: DocumentId) -> AppResult<Vec<Artifact>>;

    /// Number of artifact rows referencing a storage path.
    async fn count_by_path(&self, storage_path: &str) -> AppResult<i64>;
}

/// All stores, bundled for wiring services.
#[derive(Debug, Clone)]
pub struct StoreSet {
    /// Group store.
    pub groups: Arc<dyn GroupStore>,
    /// Category store.
    pub categories: Arc<dyn CategoryStore>,
    /// Template store.
    pub templates: Arc<dyn TemplateStore>,
    /// Document store.
    pub documents: Arc<dyn DocumentStore>,
    /// Sequence counter store.
    pub sequences: Arc<dyn SequenceStore>,
    /// Artifact store.
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl StoreSet {
    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use crate::repositories::*;

        Self {
            groups: Arc::new(GroupRepository::new(pool.clone())),
            categories: Arc::new(CategoryRepository::new(pool.clone())),
            templates: Arc::new(TemplateRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            sequences: Arc::new(SequenceRepository::new(pool.clone())),
            artifacts: Arc::new(ArtifactRepository::new(pool)),
        }
    }

    /// Stores backed by a single in-memory store.
    #[cfg(feature = "memory")]
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(crate::memory::MemoryStore::new()))
    }

    /// Stores backed by an existing in-memory store.
    #[cfg(feature = "memory")]
    pub fn from_memory(store: Arc<crate::memory::MemoryStore>) -> Self {
        Self {
            groups: store.clone(),
            categories: store.clone(),
            templates: store.clone(),
            documents: store.clone(),
            sequences: store.clone(),
            artifacts: store,
        }
    }
}
