//! Template repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::types::TemplateId;
use docreg_entity::template::{CreateTemplate, Template};

use crate::store::TemplateStore;

/// Repository for document templates.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<Template>> {
        sqlx::query_as::<_, Template>("SELECT * FROM templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find template", e))
    }

    async fn list_templates(&self) -> AppResult<Vec<Template>> {
        sqlx::query_as::<_, Template>("SELECT * FROM templates ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list templates", e))
    }

    async fn create_template(&self, data: &CreateTemplate) -> AppResult<Template> {
        sqlx::query_as::<_, Template>(
            "INSERT INTO templates (id, name, kind, body, layout_path, field_map) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(TemplateId::new())
        .bind(&data.name)
        .bind(data.kind)
        .bind(&data.body)
        .bind(&data.layout_path)
        .bind(data.field_map.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
                AppError::validation(format!(
                    "Template content does not match its kind '{}'",
                    data.kind.as_str()
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create template", e),
        })
    }
}
