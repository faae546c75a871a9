//! Document repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::{CategoryId, DocumentId, GroupId, UserId};
use docreg_entity::document::{Document, NewDocument};

use super::document_write_error;
use crate::store::DocumentStore;

/// Repository for documents.
///
/// Every mutation of an existing row is guarded by `finalized = FALSE` in
/// the same statement, so a concurrent finalize cannot be overwritten.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a guarded statement matched no row.
    async fn guard_failure(&self, id: DocumentId) -> AppError {
        match self.find_document(id).await {
            Ok(Some(_)) => AppError::finalized(format!("Document {id} is finalized")),
            Ok(None) => AppError::not_found(format!("Document {id} not found")),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn find_document(&self, id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn list_documents(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        year: i32,
    ) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents \
             WHERE category_id = $1 AND group_id = $2 AND year = $3 \
             ORDER BY sequential ASC NULLS LAST, created_at ASC",
        )
        .bind(category_id)
        .bind(group_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))
    }

    async fn list_years(&self, category_id: CategoryId, group_id: GroupId) -> AppResult<Vec<i32>> {
        sqlx::query_scalar(
            "SELECT DISTINCT year FROM documents \
             WHERE category_id = $1 AND group_id = $2 AND year IS NOT NULL \
             ORDER BY year DESC",
        )
        .bind(category_id)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list years", e))
    }

    async fn code_exists(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        code: &str,
        excluding: Option<DocumentId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM documents \
             WHERE category_id = $1 AND group_id = $2 AND code = $3 \
             AND ($4::uuid IS NULL OR id <> $4))",
        )
        .bind(category_id)
        .bind(group_id)
        .bind(code)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check code", e))
    }

    async fn insert_document(&self, data: &NewDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, group_id, category_id, template_id, created_by, \
             sender, recipient, subject, body, document_date, \
             year, sequential, code, sequence_managed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(DocumentId::new())
        .bind(data.group_id)
        .bind(data.category_id)
        .bind(data.template_id)
        .bind(data.created_by)
        .bind(&data.sender)
        .bind(&data.recipient)
        .bind(&data.subject)
        .bind(&data.body)
        .bind(data.document_date)
        .bind(data.slot.year)
        .bind(data.slot.sequential)
        .bind(&data.slot.code)
        .bind(data.slot.managed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| document_write_error(e, data.slot.code.as_deref(), "Failed to insert document"))
    }

    async fn update_document(&self, document: &Document) -> AppResult<Document> {
        let updated = sqlx::query_as::<_, Document>(
            "UPDATE documents SET template_id = $2, sender = $3, recipient = $4, \
             subject = $5, body = $6, document_date = $7, year = $8, sequential = $9, \
             code = $10, sequence_managed = $11, updated_at = NOW() \
             WHERE id = $1 AND finalized = FALSE \
             RETURNING *",
        )
        .bind(document.id)
        .bind(document.template_id)
        .bind(&document.sender)
        .bind(&document.recipient)
        .bind(&document.subject)
        .bind(&document.body)
        .bind(document.document_date)
        .bind(document.year)
        .bind(document.sequential)
        .bind(&document.code)
        .bind(document.sequence_managed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            document_write_error(e, document.code.as_deref(), "Failed to update document")
        })?;

        match updated {
            Some(doc) => Ok(doc),
            None => Err(self.guard_failure(document.id).await),
        }
    }

    async fn finalize_document(
        &self,
        id: DocumentId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<Document> {
        let finalized = sqlx::query_as::<_, Document>(
            "UPDATE documents SET finalized = TRUE, finalized_at = $2, finalized_by = $3, \
             updated_at = NOW() \
             WHERE id = $1 AND finalized = FALSE \
             RETURNING *",
        )
        .bind(id)
        .bind(at)
        .bind(by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to finalize document", e)
        })?;

        match finalized {
            Some(doc) => Ok(doc),
            None => Err(self.guard_failure(id).await),
        }
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND finalized = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(self.guard_failure(id).await);
        }
        Ok(())
    }
}
