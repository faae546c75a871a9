//! Document lifecycle: create, update, finalize, clone, delete, and listing.
//!
//! A document is a Draft until finalized; a Final document rejects update,
//! finalize, and delete. Every operation authorizes the acting user against
//! the document's group before touching anything.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use docreg_core::config::SequencingConfig;
use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;
use docreg_core::types::{CategoryId, DocumentId, TemplateId};
use docreg_database::StoreSet;
use docreg_entity::artifact::{Artifact, ArtifactKind, NewArtifact};
use docreg_entity::category::{Category, SequencePolicy};
use docreg_entity::document::{Document, NewDocument, SequenceSlot};
use docreg_render::document_variables;

use super::request::{CreateDocumentRequest, UpdateDocumentRequest};
use crate::artifact::{ArtifactCache, GeneratedPdf, RenderRequest};
use crate::context::RequestContext;
use crate::permission::{GroupAuthorizer, require_manage};
use crate::sequence::{CodeSequencer, DocumentCode, DuplicatePolicy};

/// A document together with its artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetail {
    /// The document.
    pub document: Document,
    /// Its uploaded and generated artifacts.
    pub artifacts: Vec<Artifact>,
}

/// Orchestrates the document lifecycle.
#[derive(Debug, Clone)]
pub struct DocumentService {
    stores: StoreSet,
    sequencer: CodeSequencer,
    cache: Arc<ArtifactCache>,
    storage: Arc<dyn StorageProvider>,
    authorizer: Arc<dyn GroupAuthorizer>,
    max_attempts: u32,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        stores: StoreSet,
        cache: Arc<ArtifactCache>,
        storage: Arc<dyn StorageProvider>,
        authorizer: Arc<dyn GroupAuthorizer>,
        sequencing: &SequencingConfig,
    ) -> Self {
        Self {
            sequencer: CodeSequencer::new(stores.documents.clone(), stores.sequences.clone()),
            stores,
            cache,
            storage,
            authorizer,
            max_attempts: sequencing.max_attempts.max(1),
        }
    }

    /// Create a draft document in the active group.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateDocumentRequest,
    ) -> AppResult<Document> {
        req.validate()?;
        let category = self.load_category(req.category_id).await?;
        if category.group_id != ctx.active_group {
            return Err(AppError::authorization(format!(
                "Category {} does not belong to the active group",
                category.id
            )));
        }
        require_manage(self.authorizer.as_ref(), ctx, category.group_id).await?;
        self.check_template(req.template_id).await?;

        let prefix = resolve_prefix(req.prefix.as_deref(), &category);
        let mut data = NewDocument {
            group_id: category.group_id,
            category_id: category.id,
            template_id: req.template_id,
            created_by: ctx.user_id,
            sender: req.sender.clone(),
            recipient: req.recipient.clone(),
            subject: req.subject.clone(),
            body: req.body.clone(),
            document_date: req.document_date,
            slot: SequenceSlot::default(),
        };

        let document = match category.policy() {
            SequencePolicy::Managed => {
                self.insert_managed(&mut data, &prefix, ctx.current_year())
                    .await?
            }
            SequencePolicy::Manual => {
                data.slot = self
                    .sequencer
                    .manual(
                        category.id,
                        category.group_id,
                        &prefix,
                        &req.manual_sequence(),
                        None,
                        DuplicatePolicy::Degrade,
                    )
                    .await?;
                self.insert_manual(&mut data).await?
            }
        };

        info!(
            document_id = %document.id,
            category_id = %document.category_id,
            code = ?document.code,
            "Created document"
        );
        Ok(document)
    }

    /// Update a draft document's descriptive and sequencing fields.
    ///
    /// Unlike create, a code already held by another document aborts the
    /// update and leaves the stored document unchanged.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        req: UpdateDocumentRequest,
    ) -> AppResult<Document> {
        req.validate()?;
        let mut document = self.load_authorized(ctx, id).await?;
        ensure_draft(&document)?;
        self.check_template(req.template_id).await?;
        let category = self.load_category(document.category_id).await?;
        let prefix = resolve_prefix(req.prefix.as_deref(), &category);

        document.template_id = req.template_id;
        document.sender = req.sender.clone();
        document.recipient = req.recipient.clone();
        document.subject = req.subject.clone();
        document.body = req.body.clone();
        document.document_date = req.document_date;

        let slot = match category.policy() {
            SequencePolicy::Managed => {
                self.sequencer
                    .reassign(&document, &prefix, ctx.current_year())
                    .await?
            }
            SequencePolicy::Manual => {
                self.sequencer
                    .manual(
                        category.id,
                        category.group_id,
                        &prefix,
                        &req.manual_sequence(&document.slot()),
                        Some(document.id),
                        DuplicatePolicy::Reject,
                    )
                    .await?
            }
        };
        document.apply_slot(slot);

        let updated = self.stores.documents.update_document(&document).await?;
        info!(document_id = %updated.id, code = ?updated.code, "Updated document");
        Ok(updated)
    }

    /// Finalize a draft document, recording who and when.
    pub async fn finalize(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<Document> {
        let document = self.load_authorized(ctx, id).await?;
        ensure_draft(&document)?;
        let finalized = self
            .stores
            .documents
            .finalize_document(id, ctx.user_id, ctx.request_time)
            .await?;
        info!(document_id = %id, finalized_by = %ctx.user_id, "Finalized document");
        Ok(finalized)
    }

    /// Copy a document into a new draft.
    ///
    /// Descriptive fields, template, and attachments are copied; sequencing
    /// is assigned afresh. Under the managed policy the prefix is taken back
    /// out of the source's code.
    pub async fn clone_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> AppResult<Document> {
        let source = self.load_authorized(ctx, id).await?;
        let category = self.load_category(source.category_id).await?;

        let mut data = NewDocument {
            group_id: source.group_id,
            category_id: source.category_id,
            template_id: source.template_id,
            created_by: ctx.user_id,
            sender: source.sender.clone(),
            recipient: source.recipient.clone(),
            subject: source.subject.clone(),
            body: source.body.clone(),
            document_date: source.document_date,
            slot: SequenceSlot::default(),
        };

        let copy = match category.policy() {
            SequencePolicy::Managed => {
                let prefix = source
                    .code
                    .as_deref()
                    .map(DocumentCode::prefix_of)
                    .unwrap_or_default()
                    .to_string();
                self.insert_managed(&mut data, &prefix, ctx.current_year())
                    .await?
            }
            SequencePolicy::Manual => self.stores.documents.insert_document(&data).await?,
        };

        for artifact in self.stores.artifacts.list_artifacts(source.id).await? {
            if artifact.kind != ArtifactKind::Upload {
                continue;
            }
            self.stores
                .artifacts
                .insert_artifact(&NewArtifact {
                    document_id: copy.id,
                    kind: ArtifactKind::Upload,
                    original_name: artifact.original_name,
                    storage_path: artifact.storage_path,
                    content_hash: artifact.content_hash,
                    mime_type: artifact.mime_type,
                    size_bytes: artifact.size_bytes,
                    uploaded_by: ctx.user_id,
                })
                .await?;
        }

        info!(source_id = %source.id, document_id = %copy.id, code = ?copy.code, "Cloned document");
        Ok(copy)
    }

    /// Delete a draft document, its artifact rows, and any backing file
    /// no other artifact still references.
    pub async fn delete(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<()> {
        let document = self.load_authorized(ctx, id).await?;
        ensure_draft(&document)?;

        let paths: BTreeSet<String> = self
            .stores
            .artifacts
            .list_artifacts(id)
            .await?
            .into_iter()
            .map(|artifact| artifact.storage_path)
            .collect();

        self.stores.documents.delete_document(id).await?;

        for path in paths {
            if self.stores.artifacts.count_by_path(&path).await? > 0 {
                continue;
            }
            if let Err(e) = self.storage.delete(&path).await {
                warn!(document_id = %id, path = %path, error = %e, "Failed to delete artifact file");
            }
        }

        info!(document_id = %id, "Deleted document");
        Ok(())
    }

    /// Documents of a category in the active group for `year`
    /// (the current year when `None`).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        category_id: CategoryId,
        year: Option<i32>,
    ) -> AppResult<Vec<Document>> {
        let category = self.load_active_category(ctx, category_id).await?;
        let year = year.unwrap_or_else(|| ctx.current_year());
        self.stores
            .documents
            .list_documents(category.id, category.group_id, year)
            .await
    }

    /// Years with documents in a category of the active group, newest first.
    pub async fn list_years(
        &self,
        ctx: &RequestContext,
        category_id: CategoryId,
    ) -> AppResult<Vec<i32>> {
        let category = self.load_active_category(ctx, category_id).await?;
        self.stores
            .documents
            .list_years(category.id, category.group_id)
            .await
    }

    /// A document with its artifacts.
    pub async fn get(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<DocumentDetail> {
        let document = self.load_authorized(ctx, id).await?;
        let artifacts = self.stores.artifacts.list_artifacts(id).await?;
        Ok(DocumentDetail {
            document,
            artifacts,
        })
    }

    /// The document's PDF, generated at most once per distinct content.
    pub async fn generate_pdf(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<GeneratedPdf> {
        let document = self.load_authorized(ctx, id).await?;
        let template_id = document.template_id.ok_or_else(|| {
            AppError::missing_template(format!("Document {id} has no template"))
        })?;
        let template = self
            .stores
            .templates
            .find_template(template_id)
            .await?
            .ok_or_else(|| {
                AppError::missing_template(format!("Template {template_id} no longer exists"))
            })?;
        let group = self
            .stores
            .groups
            .find_group(document.group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {} not found", document.group_id)))?;
        let category = self.load_category(document.category_id).await?;

        let original_name = artifact_name(&group.name, &category.prefix, document.code.as_deref());
        let variables = document_variables(&document);

        self.cache
            .get_or_render(RenderRequest {
                document: &document,
                template: &template,
                variables: &variables,
                original_name: &original_name,
                requested_by: ctx.user_id,
            })
            .await
    }

    async fn insert_managed(
        &self,
        data: &mut NewDocument,
        prefix: &str,
        year: i32,
    ) -> AppResult<Document> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            data.slot = self
                .sequencer
                .allocate(data.category_id, data.group_id, prefix, year)
                .await?;
            match self.stores.documents.insert_document(data).await {
                Ok(document) => return Ok(document),
                Err(e)
                    if (e.is(ErrorKind::SequenceConflict) || e.is(ErrorKind::DuplicateCode))
                        && attempt < self.max_attempts =>
                {
                    warn!(
                        attempt,
                        code = ?data.slot.code,
                        error = %e,
                        "Managed slot rejected, allocating another"
                    );
                }
                Err(e) if e.is(ErrorKind::SequenceConflict) || e.is(ErrorKind::DuplicateCode) => {
                    return Err(AppError::conflict(format!(
                        "Could not allocate a sequential after {attempt} attempts: {}",
                        e.message
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn insert_manual(&self, data: &mut NewDocument) -> AppResult<Document> {
        match self.stores.documents.insert_document(data).await {
            Err(e) if e.is(ErrorKind::DuplicateCode) => {
                // Another writer took the code after it was checked.
                warn!(code = ?data.slot.code, "Duplicate code dropped on insert");
                data.slot.code = None;
                self.stores.documents.insert_document(data).await
            }
            other => other,
        }
    }

    async fn load_category(&self, id: CategoryId) -> AppResult<Category> {
        self.stores
            .categories
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    async fn load_active_category(
        &self,
        ctx: &RequestContext,
        id: CategoryId,
    ) -> AppResult<Category> {
        let category = self.load_category(id).await?;
        if category.group_id != ctx.active_group {
            return Err(AppError::authorization(format!(
                "Category {id} does not belong to the active group"
            )));
        }
        require_manage(self.authorizer.as_ref(), ctx, category.group_id).await?;
        Ok(category)
    }

    async fn load_authorized(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<Document> {
        let document = self
            .stores
            .documents
            .find_document(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        require_manage(self.authorizer.as_ref(), ctx, document.group_id).await?;
        Ok(document)
    }

    async fn check_template(&self, id: Option<TemplateId>) -> AppResult<()> {
        if let Some(id) = id {
            if self.stores.templates.find_template(id).await?.is_none() {
                return Err(AppError::validation(format!("Template {id} not found")));
            }
        }
        Ok(())
    }
}

fn ensure_draft(document: &Document) -> AppResult<()> {
    if !document.state().is_mutable() {
        return Err(AppError::finalized(format!(
            "Document {} is finalized",
            document.id
        )));
    }
    Ok(())
}

/// The requested prefix, or the category's when none was given.
fn resolve_prefix(requested: Option<&str>, category: &Category) -> String {
    requested
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(category.prefix.as_str())
        .to_string()
}

/// File name of a generated PDF: `{group}_{prefix}_{digits}.pdf`.
pub fn artifact_name(group_name: &str, prefix: &str, code: Option<&str>) -> String {
    let digits = code
        .and_then(DocumentCode::sequential_digits)
        .unwrap_or_default();
    format!("{group_name}_{prefix}_{digits}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            artifact_name("Finance", "MEM", Some("MEM Nº 007/2024")),
            "Finance_MEM_007.pdf"
        );
        assert_eq!(artifact_name("Finance", "MEM", Some("X-1")), "Finance_MEM_.pdf");
        assert_eq!(artifact_name("Finance", "MEM", None), "Finance_MEM_.pdf");
    }
}
