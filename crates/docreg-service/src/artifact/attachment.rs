//! User-uploaded attachments.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;
use docreg_core::types::DocumentId;
use docreg_database::{ArtifactStore, DocumentStore};
use docreg_entity::artifact::{Artifact, ArtifactKind, NewArtifact};

use crate::context::RequestContext;
use crate::permission::{GroupAuthorizer, require_manage};

/// Blob storage prefix for attachments.
pub const ATTACHMENT_DIR: &str = "documents/attachments";

/// An attachment to store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachmentUpload {
    /// File name as provided by the user.
    #[validate(length(min = 1, max = 255))]
    pub original_name: String,
    /// MIME type.
    #[validate(length(min = 1, max = 127))]
    pub mime_type: String,
    /// File content.
    #[serde(skip)]
    pub data: Bytes,
}

/// Stores and lists document attachments.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    documents: Arc<dyn DocumentStore>,
    artifacts: Arc<dyn ArtifactStore>,
    storage: Arc<dyn StorageProvider>,
    authorizer: Arc<dyn GroupAuthorizer>,
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        artifacts: Arc<dyn ArtifactStore>,
        storage: Arc<dyn StorageProvider>,
        authorizer: Arc<dyn GroupAuthorizer>,
    ) -> Self {
        Self {
            documents,
            artifacts,
            storage,
            authorizer,
        }
    }

    /// Attach a file to a draft document.
    pub async fn attach(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        upload: AttachmentUpload,
    ) -> AppResult<Artifact> {
        upload.validate()?;
        let document = self
            .documents
            .find_document(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        require_manage(self.authorizer.as_ref(), ctx, document.group_id).await?;
        if !document.state().is_mutable() {
            return Err(AppError::finalized(format!(
                "Document {document_id} is finalized"
            )));
        }

        let path = format!(
            "{ATTACHMENT_DIR}/{}-{}",
            Uuid::now_v7(),
            sanitize_file_name(&upload.original_name)
        );
        let size = upload.data.len() as i64;
        self.storage.write(&path, upload.data).await?;

        let inserted = self
            .artifacts
            .insert_artifact(&NewArtifact {
                document_id,
                kind: ArtifactKind::Upload,
                original_name: upload.original_name,
                storage_path: path.clone(),
                content_hash: None,
                mime_type: upload.mime_type,
                size_bytes: size,
                uploaded_by: ctx.user_id,
            })
            .await;

        match inserted {
            Ok(artifact) => {
                info!(%document_id, path = %path, size, "Stored attachment");
                Ok(artifact)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!(path = %path, error = %cleanup, "Failed to remove orphaned attachment");
                }
                Err(e)
            }
        }
    }

    /// List a document's artifacts, attachments and generated PDFs alike.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<Vec<Artifact>> {
        let document = self
            .documents
            .find_document(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        require_manage(self.authorizer.as_ref(), ctx, document.group_id).await?;
        self.artifacts.list_artifacts(document_id).await
    }

    /// Read an artifact's bytes.
    pub async fn read(&self, artifact: &Artifact) -> AppResult<Bytes> {
        self.storage.read_bytes(&artifact.storage_path).await
    }
}

/// Reduce a user-supplied file name to a safe storage path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Relatório final.pdf"), "Relat_rio_final.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\a b.txt"), "a_b.txt");
        assert_eq!(sanitize_file_name(".."), "file");
    }
}
