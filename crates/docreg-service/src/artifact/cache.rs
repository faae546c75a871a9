//! Content-addressed cache of generated PDFs.
//!
//! A generated PDF is stored at a path derived from the hash of its
//! rendered content and linked to each document by an artifact row. A
//! request is served from storage when the document already has a row at
//! that path and the file is present; otherwise the PDF is rendered,
//! stored, and the row upserted. Generation is serialized per content hash
//! so concurrent requests for the same uncached content render once.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::traits::pdf::PdfRenderer;
use docreg_core::traits::storage::StorageProvider;
use docreg_core::types::UserId;
use docreg_database::ArtifactStore;
use docreg_entity::artifact::{Artifact, ArtifactKind, NewArtifact, PDF_MIME};
use docreg_entity::document::Document;
use docreg_entity::template::Template;
use docreg_render::{TemplateRenderer, Variables, content_hash, generated_path};

/// Everything needed to produce a document's PDF.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// The document the artifact belongs to.
    pub document: &'a Document,
    /// The document's template.
    pub template: &'a Template,
    /// Template variables.
    pub variables: &'a Variables,
    /// File name recorded on the artifact row.
    pub original_name: &'a str,
    /// The acting user.
    pub requested_by: UserId,
}

/// A generated PDF and its artifact row.
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    /// The document's generated artifact row.
    pub artifact: Artifact,
    /// The PDF bytes.
    pub bytes: Bytes,
    /// Whether the bytes came from an existing artifact.
    pub cache_hit: bool,
}

/// Idempotent PDF generation keyed by rendered content.
#[derive(Debug)]
pub struct ArtifactCache {
    artifacts: Arc<dyn ArtifactStore>,
    storage: Arc<dyn StorageProvider>,
    templates: TemplateRenderer,
    pdf: Arc<dyn PdfRenderer>,
    /// One generation lock per content hash currently being served.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ArtifactCache {
    /// Creates a new artifact cache.
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        storage: Arc<dyn StorageProvider>,
        pdf: Arc<dyn PdfRenderer>,
    ) -> Self {
        Self {
            artifacts,
            templates: TemplateRenderer::new(storage.clone()),
            storage,
            pdf,
            locks: DashMap::new(),
        }
    }

    /// Return the document's PDF, generating it only when no usable
    /// artifact exists for the current content.
    pub async fn get_or_render(&self, request: RenderRequest<'_>) -> AppResult<GeneratedPdf> {
        let content = self
            .templates
            .render(request.template, request.variables)
            .await?;
        let hash = content_hash(&content);
        let path = generated_path(&hash);

        let lock = self.locks.entry(hash.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.serve(&request, content, &hash, &path).await
        };
        drop(lock);
        self.locks
            .remove_if(&hash, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn serve(
        &self,
        request: &RenderRequest<'_>,
        content: docreg_render::RenderedContent,
        hash: &str,
        path: &str,
    ) -> AppResult<GeneratedPdf> {
        let document_id = request.document.id;

        if let Some(artifact) = self.artifacts.find_generated(document_id, path).await? {
            match self.storage.read_bytes(path).await {
                Ok(bytes) => {
                    debug!(%document_id, path, "Generated artifact cache hit");
                    return Ok(GeneratedPdf {
                        artifact,
                        bytes,
                        cache_hit: true,
                    });
                }
                Err(e) if e.is(ErrorKind::NotFound) => {
                    warn!(%document_id, path, "Artifact file missing, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        let pdf = self.pdf.clone();
        let rendered = tokio::task::spawn_blocking(move || pdf.render(&content))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "PDF render task failed", e))??;

        self.storage.write(path, rendered).await?;
        let bytes = self.storage.read_bytes(path).await?;

        let artifact = self
            .artifacts
            .upsert_generated(&NewArtifact {
                document_id,
                kind: ArtifactKind::Generated,
                original_name: request.original_name.to_string(),
                storage_path: path.to_string(),
                content_hash: Some(hash.to_string()),
                mime_type: PDF_MIME.to_string(),
                size_bytes: bytes.len() as i64,
                uploaded_by: request.requested_by,
            })
            .await?;

        info!(
            %document_id,
            path,
            size = bytes.len(),
            backend = self.pdf.backend(),
            "Generated document PDF"
        );
        Ok(GeneratedPdf {
            artifact,
            bytes,
            cache_hit: false,
        })
    }

    /// Number of content hashes with generation in flight.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}
