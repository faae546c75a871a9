//! Category repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::{CategoryId, GroupId};
use docreg_entity::category::{Category, CreateCategory};

use crate::store::CategoryStore;

/// Repository for document categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    async fn list_categories(&self, group_id: GroupId) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE group_id = $1 ORDER BY name ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, group_id, name, prefix, sequence_managed) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(CategoryId::new())
        .bind(data.group_id)
        .bind(&data.name)
        .bind(&data.prefix)
        .bind(data.sequence_managed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!("Group {} not found", data.group_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create category", e),
        })
    }
}
