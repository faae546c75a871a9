//! Per-partition sequential counter.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_entity::document::SequenceKey;

use crate::store::SequenceStore;

/// Repository for the `document_sequences` counter table.
///
/// Allocation is a single upsert, so concurrent callers on the same
/// partition serialize on the counter row and never receive the same value.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: PgPool,
}

impl SequenceRepository {
    /// Create a new sequence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for SequenceRepository {
    async fn next_sequential(&self, key: &SequenceKey) -> AppResult<i32> {
        // A missing counter row is seeded from the documents already in the
        // partition, so data created before the counter existed is respected.
        let value: i32 = sqlx::query_scalar(
            "INSERT INTO document_sequences (category_id, group_id, year, last_value, updated_at) \
             SELECT $1, $2, $3, COALESCE(MAX(sequential), 0) + 1, NOW() \
             FROM documents WHERE category_id = $1 AND group_id = $2 AND year = $3 \
             ON CONFLICT (category_id, group_id, year) DO UPDATE \
             SET last_value = document_sequences.last_value + 1, updated_at = NOW() \
             RETURNING last_value",
        )
        .bind(key.category_id)
        .bind(key.group_id)
        .bind(key.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to allocate sequential", e)
        })?;

        debug!(
            category_id = %key.category_id,
            group_id = %key.group_id,
            year = key.year,
            sequential = value,
            "Allocated sequential"
        );
        Ok(value)
    }
}
