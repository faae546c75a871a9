//! Artifact repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::{ArtifactId, DocumentId};
use docreg_entity::artifact::{Artifact, ArtifactKind, NewArtifact};

use crate::store::ArtifactStore;

/// Repository for document artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactRepository {
    pool: PgPool,
}

impl ArtifactRepository {
    /// Create a new artifact repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactStore for ArtifactRepository {
    async fn find_generated(
        &self,
        document_id: DocumentId,
        storage_path: &str,
    ) -> AppResult<Option<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            "SELECT * FROM artifacts \
             WHERE document_id = $1 AND storage_path = $2 AND kind = 'generated'",
        )
        .bind(document_id)
        .bind(storage_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find artifact", e))
    }

    async fn upsert_generated(&self, data: &NewArtifact) -> AppResult<Artifact> {
        sqlx::query_as::<_, Artifact>(
            "INSERT INTO artifacts (id, document_id, kind, original_name, storage_path, \
             content_hash, mime_type, size_bytes, uploaded_by) \
             VALUES ($1, $2, 'generated', $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (document_id, storage_path) WHERE kind = 'generated' DO UPDATE \
             SET original_name = EXCLUDED.original_name, \
                 content_hash = EXCLUDED.content_hash, \
                 mime_type = EXCLUDED.mime_type, \
                 size_bytes = EXCLUDED.size_bytes, \
                 uploaded_by = EXCLUDED.uploaded_by, \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(ArtifactId::new())
        .bind(data.document_id)
        .bind(&data.original_name)
        .bind(&data.storage_path)
        .bind(&data.content_hash)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(data.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert artifact", e))
    }

    async fn insert_artifact(&self, data: &NewArtifact) -> AppResult<Artifact> {
        if data.kind == ArtifactKind::Generated {
            return self.upsert_generated(data).await;
        }
        sqlx::query_as::<_, Artifact>(
            "INSERT INTO artifacts (id, document_id, kind, original_name, storage_path, \
             content_hash, mime_type, size_bytes, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(ArtifactId::new())
        .bind(data.document_id)
        .bind(data.kind)
        .bind(&data.original_name)
        .bind(&data.storage_path)
        .bind(&data.content_hash)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(data.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!("Document {} not found", data.document_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert artifact", e),
        })
    }

    async fn list_artifacts(&self, document_id: DocumentId) -> AppResult<Vec<Artifact>> {
        sqlx::query_as::<_, Artifact>(
            "SELECT * FROM artifacts WHERE document_id = $1 ORDER BY created_at ASC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list artifacts", e))
    }

    async fn count_by_path(&self, storage_path: &str) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM artifacts WHERE storage_path = $1")
            .bind(storage_path)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count artifacts", e)
            })
    }
}
