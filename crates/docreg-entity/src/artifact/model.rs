//! Artifact entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docreg_core::types::{ArtifactId, DocumentId, UserId};

/// MIME type of generated artifacts.
pub const PDF_MIME: &str = "application/pdf";

/// Where an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "artifact_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Attached by a user.
    Upload,
    /// Rendered from the document's template.
    Generated,
}

impl ArtifactKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Generated => "generated",
        }
    }
}

/// A file linked to a document.
///
/// Generated artifacts live at a path derived from their content hash, so
/// several rows (one per document) may point at the same stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Artifact {
    /// Unique artifact identifier.
    pub id: ArtifactId,
    /// The owning document.
    pub document_id: DocumentId,
    /// Upload or generated.
    pub kind: ArtifactKind,
    /// File name presented to users.
    pub original_name: String,
    /// Path within blob storage.
    pub storage_path: String,
    /// Content hash (generated artifacts only).
    pub content_hash: Option<String>,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// The user who uploaded or triggered generation.
    pub uploaded_by: UserId,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert or upsert an artifact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtifact {
    /// The owning document.
    pub document_id: DocumentId,
    /// Upload or generated.
    pub kind: ArtifactKind,
    /// File name presented to users.
    pub original_name: String,
    /// Path within blob storage.
    pub storage_path: String,
    /// Content hash.
    pub content_hash: Option<String>,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Acting user.
    pub uploaded_by: UserId,
}
