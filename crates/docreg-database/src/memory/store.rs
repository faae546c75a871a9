//! [`MemoryStore`]: every store trait over one lock-protected table set.
//!
//! Each trait method takes the table lock once, so checks and writes inside
//! a method are atomic with respect to other callers, mirroring the single
//! statements the PostgreSQL repositories issue.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::types::{ArtifactId, CategoryId, DocumentId, GroupId, TemplateId, UserId};
use docreg_entity::artifact::{Artifact, ArtifactKind, NewArtifact};
use docreg_entity::category::{Category, CreateCategory};
use docreg_entity::document::{Document, NewDocument, SequenceKey};
use docreg_entity::group::{CreateGroup, Group};
use docreg_entity::template::{CreateTemplate, Template, TemplateKind};

use crate::store::{
    ArtifactStore, CategoryStore, DocumentStore, GroupStore, SequenceStore, TemplateStore,
};

#[derive(Debug, Default)]
struct Tables {
    groups: HashMap<GroupId, Group>,
    categories: HashMap<CategoryId, Category>,
    templates: HashMap<TemplateId, Template>,
    documents: HashMap<DocumentId, Document>,
    sequences: HashMap<SequenceKey, i32>,
    artifacts: HashMap<ArtifactId, Artifact>,
}

impl Tables {
    fn code_taken(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        code: &str,
        excluding: Option<DocumentId>,
    ) -> bool {
        self.documents.values().any(|doc| {
            doc.category_id == category_id
                && doc.group_id == group_id
                && doc.code.as_deref() == Some(code)
                && Some(doc.id) != excluding
        })
    }

    fn sequential_taken(&self, candidate: &Document) -> bool {
        if !candidate.sequence_managed || candidate.sequential.is_none() {
            return false;
        }
        self.documents.values().any(|doc| {
            doc.id != candidate.id
                && doc.sequence_managed
                && doc.category_id == candidate.category_id
                && doc.group_id == candidate.group_id
                && doc.year == candidate.year
                && doc.sequential == candidate.sequential
        })
    }

    /// Enforce the unique indexes for a row about to be written.
    fn check_unique(&self, candidate: &Document) -> AppResult<()> {
        if let Some(code) = candidate.code.as_deref() {
            if self.code_taken(
                candidate.category_id,
                candidate.group_id,
                code,
                Some(candidate.id),
            ) {
                return Err(AppError::duplicate_code(code));
            }
        }
        if self.sequential_taken(candidate) {
            return Err(AppError::sequence_conflict(
                "Sequential number already taken in this partition",
            ));
        }
        Ok(())
    }

    /// Fetch a document that is still a draft.
    fn draft_mut(&mut self, id: DocumentId) -> AppResult<&mut Document> {
        match self.documents.get_mut(&id) {
            None => Err(AppError::not_found(format!("Document {id} not found"))),
            Some(doc) if !doc.state().is_mutable() => {
                Err(AppError::finalized(format!("Document {id} is finalized")))
            }
            Some(doc) => Ok(doc),
        }
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn find_group(&self, id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let mut groups: Vec<Group> = self.tables.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn create_group(&self, data: &CreateGroup) -> AppResult<Group> {
        let group = Group {
            id: GroupId::new(),
            name: data.name.clone(),
            description: data.description.clone(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .groups
            .insert(group.id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, id: GroupId, data: &CreateGroup) -> AppResult<Group> {
        let mut tables = self.tables.write().await;
        let group = tables
            .groups
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))?;
        group.name = data.name.clone();
        group.description = data.description.clone();
        Ok(group.clone())
    }

    async fn delete_group(&self, id: GroupId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&id) {
            return Err(AppError::not_found(format!("Group {id} not found")));
        }
        if tables.documents.values().any(|d| d.group_id == id) {
            return Err(AppError::conflict(format!("Group {id} still has documents")));
        }
        tables.groups.remove(&id);
        tables.categories.retain(|_, c| c.group_id != id);
        tables.sequences.retain(|key, _| key.group_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self, group_id: GroupId) -> AppResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.group_id == group_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&data.group_id) {
            return Err(AppError::not_found(format!(
                "Group {} not found",
                data.group_id
            )));
        }
        let category = Category {
            id: CategoryId::new(),
            group_id: data.group_id,
            name: data.name.clone(),
            prefix: data.prefix.clone(),
            sequence_managed: data.sequence_managed,
            created_at: Utc::now(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<Template>> {
        Ok(self.tables.read().await.templates.get(&id).cloned())
    }

    async fn list_templates(&self) -> AppResult<Vec<Template>> {
        let tables = self.tables.read().await;
        let mut templates: Vec<Template> = tables.templates.values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn create_template(&self, data: &CreateTemplate) -> AppResult<Template> {
        let consistent = match data.kind {
            TemplateKind::Plain => data.body.is_some(),
            TemplateKind::Layout => data.layout_path.is_some() && data.field_map.is_some(),
        };
        if !consistent {
            return Err(AppError::validation(format!(
                "Template content does not match its kind '{}'",
                data.kind.as_str()
            )));
        }
        let template = Template {
            id: TemplateId::new(),
            name: data.name.clone(),
            kind: data.kind,
            body: data.body.clone(),
            layout_path: data.layout_path.clone(),
            field_map: data.field_map.clone().map(Json),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .templates
            .insert(template.id, template.clone());
        Ok(template)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_document(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.tables.read().await.documents.get(&id).cloned())
    }

    async fn list_documents(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        year: i32,
    ) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| {
                d.category_id == category_id && d.group_id == group_id && d.year == Some(year)
            })
            .cloned()
            .collect();
        // NULLS LAST on sequential, then creation time.
        documents.sort_by(|a, b| {
            (a.sequential.is_none(), a.sequential, a.created_at, a.id).cmp(&(
                b.sequential.is_none(),
                b.sequential,
                b.created_at,
                b.id,
            ))
        });
        Ok(documents)
    }

    async fn list_years(&self, category_id: CategoryId, group_id: GroupId) -> AppResult<Vec<i32>> {
        let tables = self.tables.read().await;
        let years: BTreeSet<i32> = tables
            .documents
            .values()
            .filter(|d| d.category_id == category_id && d.group_id == group_id)
            .filter_map(|d| d.year)
            .collect();
        Ok(years.into_iter().rev().collect())
    }

    async fn code_exists(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        code: &str,
        excluding: Option<DocumentId>,
    ) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .code_taken(category_id, group_id, code, excluding))
    }

    async fn insert_document(&self, data: &NewDocument) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(),
            group_id: data.group_id,
            category_id: data.category_id,
            template_id: data.template_id,
            created_by: data.created_by,
            sender: data.sender.clone(),
            recipient: data.recipient.clone(),
            subject: data.subject.clone(),
            body: data.body.clone(),
            document_date: data.document_date,
            year: data.slot.year,
            sequential: data.slot.sequential,
            code: data.slot.code.clone(),
            sequence_managed: data.slot.managed,
            finalized: false,
            finalized_at: None,
            finalized_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.check_unique(&document)?;
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn update_document(&self, document: &Document) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        tables.draft_mut(document.id)?;
        tables.check_unique(document)?;

        let stored = tables.draft_mut(document.id)?;
        stored.template_id = document.template_id;
        stored.sender = document.sender.clone();
        stored.recipient = document.recipient.clone();
        stored.subject = document.subject.clone();
        stored.body = document.body.clone();
        stored.document_date = document.document_date;
        stored.year = document.year;
        stored.sequential = document.sequential;
        stored.code = document.code.clone();
        stored.sequence_managed = document.sequence_managed;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn finalize_document(
        &self,
        id: DocumentId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        let stored = tables.draft_mut(id)?;
        stored.finalized = true;
        stored.finalized_at = Some(at);
        stored.finalized_by = Some(by);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.draft_mut(id)?;
        tables.documents.remove(&id);
        tables.artifacts.retain(|_, a| a.document_id != id);
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for MemoryStore {
    async fn next_sequential(&self, key: &SequenceKey) -> AppResult<i32> {
        let mut tables = self.tables.write().await;
        let next = match tables.sequences.get(key) {
            Some(last) => last + 1,
            None => {
                tables
                    .documents
                    .values()
                    .filter(|d| {
                        d.category_id == key.category_id
                            && d.group_id == key.group_id
                            && d.year == Some(key.year)
                    })
                    .filter_map(|d| d.sequential)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };
        tables.sequences.insert(*key, next);
        Ok(next)
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn find_generated(
        &self,
        document_id: DocumentId,
        storage_path: &str,
    ) -> AppResult<Option<Artifact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .artifacts
            .values()
            .find(|a| {
                a.kind == ArtifactKind::Generated
                    && a.document_id == document_id
                    && a.storage_path == storage_path
            })
            .cloned())
    }

    async fn upsert_generated(&self, data: &NewArtifact) -> AppResult<Artifact> {
        let mut tables = self.tables.write().await;
        if !tables.documents.contains_key(&data.document_id) {
            return Err(AppError::not_found(format!(
                "Document {} not found",
                data.document_id
            )));
        }
        let now = Utc::now();
        let existing = tables.artifacts.values_mut().find(|a| {
            a.kind == ArtifactKind::Generated
                && a.document_id == data.document_id
                && a.storage_path == data.storage_path
        });
        if let Some(artifact) = existing {
            artifact.original_name = data.original_name.clone();
            artifact.content_hash = data.content_hash.clone();
            artifact.mime_type = data.mime_type.clone();
            artifact.size_bytes = data.size_bytes;
            artifact.uploaded_by = data.uploaded_by;
            artifact.updated_at = now;
            return Ok(artifact.clone());
        }
        let artifact = Artifact {
            id: ArtifactId::new(),
            document_id: data.document_id,
            kind: ArtifactKind::Generated,
            original_name: data.original_name.clone(),
            storage_path: data.storage_path.clone(),
            content_hash: data.content_hash.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            uploaded_by: data.uploaded_by,
            created_at: now,
            updated_at: now,
        };
        tables.artifacts.insert(artifact.id, artifact.clone());
        Ok(artifact)
    }

    async fn insert_artifact(&self, data: &NewArtifact) -> AppResult<Artifact> {
        if data.kind == ArtifactKind::Generated {
            return self.upsert_generated(data).await;
        }
        let mut tables = self.tables.write().await;
        if !tables.documents.contains_key(&data.document_id) {
            return Err(AppError::not_found(format!(
                "Document {} not found",
                data.document_id
            )));
        }
        let now = Utc::now();
        let artifact = Artifact {
            id: ArtifactId::new(),
            document_id: data.document_id,
            kind: data.kind,
            original_name: data.original_name.clone(),
            storage_path: data.storage_path.clone(),
            content_hash: data.content_hash.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            uploaded_by: data.uploaded_by,
            created_at: now,
            updated_at: now,
        };
        tables.artifacts.insert(artifact.id, artifact.clone());
        Ok(artifact)
    }

    async fn list_artifacts(&self, document_id: DocumentId) -> AppResult<Vec<Artifact>> {
        let tables = self.tables.read().await;
        let mut artifacts: Vec<Artifact> = tables
            .artifacts
            .values()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect();
        artifacts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(artifacts)
    }

    async fn count_by_path(&self, storage_path: &str) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .artifacts
            .values()
            .filter(|a| a.storage_path == storage_path)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use docreg_core::error::ErrorKind;
    use docreg_entity::document::SequenceSlot;

    use super::*;

    async fn partition(store: &MemoryStore) -> (GroupId, CategoryId) {
        let group = store
            .create_group(&CreateGroup {
                name: "Finance".into(),
                description: None,
            })
            .await
            .unwrap();
        let category = store
            .create_category(&CreateCategory {
                group_id: group.id,
                name: "Memorando".into(),
                prefix: "MEM".into(),
                sequence_managed: true,
            })
            .await
            .unwrap();
        (group.id, category.id)
    }

    fn new_doc(group_id: GroupId, category_id: CategoryId, slot: SequenceSlot) -> NewDocument {
        NewDocument {
            group_id,
            category_id,
            template_id: None,
            created_by: UserId::new(),
            sender: "Board".into(),
            recipient: "Staff".into(),
            subject: "Notice".into(),
            body: "Body".into(),
            document_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            slot,
        }
    }

    fn managed(year: i32, sequential: i32) -> SequenceSlot {
        SequenceSlot {
            year: Some(year),
            sequential: Some(sequential),
            code: Some(format!("MEM Nº {sequential:03}/{year}")),
            managed: true,
        }
    }

    #[tokio::test]
    async fn test_counter_seeds_from_existing_rows() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 7)))
            .await
            .unwrap();

        let key = SequenceKey::new(category_id, group_id, 2024);
        assert_eq!(store.next_sequential(&key).await.unwrap(), 8);
        assert_eq!(store.next_sequential(&key).await.unwrap(), 9);

        let other_year = SequenceKey::new(category_id, group_id, 2025);
        assert_eq!(store.next_sequential(&other_year).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_code_and_sequential() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 1)))
            .await
            .unwrap();

        let err = store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateCode);

        let mut same_slot = managed(2024, 1);
        same_slot.code = Some("custom".into());
        let err = store
            .insert_document(&new_doc(group_id, category_id, same_slot))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SequenceConflict);

        // Manual rows may share a sequential; only codes stay unique.
        let manual = SequenceSlot {
            year: Some(2024),
            sequential: Some(1),
            code: None,
            managed: false,
        };
        store
            .insert_document(&new_doc(group_id, category_id, manual))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_finalized_rows_reject_mutation() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        let doc = store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 1)))
            .await
            .unwrap();

        let user = UserId::new();
        store
            .finalize_document(doc.id, user, Utc::now())
            .await
            .unwrap();

        let err = store
            .finalize_document(doc.id, user, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Finalized);
        let err = store.update_document(&doc).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Finalized);
        let err = store.delete_document(doc.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Finalized);

        let err = store.delete_document(DocumentId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_generated_upsert_and_path_count() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        let doc = store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 1)))
            .await
            .unwrap();

        let row = NewArtifact {
            document_id: doc.id,
            kind: ArtifactKind::Generated,
            original_name: "Finance_MEM_001.pdf".into(),
            storage_path: "documents/generated/abc.pdf".into(),
            content_hash: Some("abc".into()),
            mime_type: "application/pdf".into(),
            size_bytes: 10,
            uploaded_by: UserId::new(),
        };
        let first = store.upsert_generated(&row).await.unwrap();
        let second = store
            .upsert_generated(&NewArtifact {
                size_bytes: 12,
                ..row.clone()
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.size_bytes, 12);
        assert_eq!(store.list_artifacts(doc.id).await.unwrap().len(), 1);
        assert_eq!(store.count_by_path(&row.storage_path).await.unwrap(), 1);

        store.delete_document(doc.id).await.unwrap();
        assert_eq!(store.count_by_path(&row.storage_path).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_years_descending() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        for (year, seq) in [(2022, 1), (2024, 1), (2022, 2)] {
            store
                .insert_document(&new_doc(group_id, category_id, managed(year, seq)))
                .await
                .unwrap();
        }
        assert_eq!(
            store.list_years(category_id, group_id).await.unwrap(),
            vec![2024, 2022]
        );
        let docs = store
            .list_documents(category_id, group_id, 2022)
            .await
            .unwrap();
        let seqs: Vec<_> = docs.iter().map(|d| d.sequential).collect();
        assert_eq!(seqs, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_delete_group_refuses_while_documents_remain() {
        let store = MemoryStore::new();
        let (group_id, category_id) = partition(&store).await;
        let doc = store
            .insert_document(&new_doc(group_id, category_id, managed(2024, 1)))
            .await
            .unwrap();

        let err = store.delete_group(group_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(store.find_group(group_id).await.unwrap().is_some());

        store.delete_document(doc.id).await.unwrap();
        store.delete_group(group_id).await.unwrap();
        assert!(store.find_group(group_id).await.unwrap().is_none());
        assert!(store.find_category(category_id).await.unwrap().is_none());

        let err = store.delete_group(group_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
