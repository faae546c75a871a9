//! Group repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::GroupId;
use docreg_entity::group::{CreateGroup, Group};

use crate::store::GroupStore;

/// Repository for groups.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn find_group(&self, id: GroupId) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group", e))
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    async fn create_group(&self, data: &CreateGroup) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (id, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(GroupId::new())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create group", e))
    }

    async fn update_group(&self, id: GroupId, data: &CreateGroup) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "UPDATE groups SET name = $2, description = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update group", e))?
        .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))
    }

    async fn delete_group(&self, id: GroupId) -> AppResult<()> {
        // Categories and counters cascade; documents hold a restricting key.
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::conflict(format!("Group {id} still has documents"))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete group", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Group {id} not found")));
        }
        Ok(())
    }
}
