//! Template creation and lookup.
//!
//! Layout templates keep their layout file in blob storage and are
//! validated against their field map when saved.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;
use docreg_core::types::TemplateId;
use docreg_database::TemplateStore;
use docreg_entity::template::{CreateTemplate, FieldMap, Template, TemplateKind};

/// Blob storage prefix for layout files.
pub const TEMPLATE_DIR: &str = "templates";

/// Request to create a plain-text template.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlainTemplateRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Body with `{{ key }}` placeholders.
    #[validate(length(min = 1))]
    pub body: String,
}

/// Request to create a layout template.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLayoutTemplateRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Layout file content (UTF-8 text).
    #[serde(skip)]
    pub layout: Bytes,
    /// Field-to-placeholder mapping.
    pub field_map: FieldMap,
}

/// Manages templates.
#[derive(Debug, Clone)]
pub struct TemplateService {
    templates: Arc<dyn TemplateStore>,
    storage: Arc<dyn StorageProvider>,
}

impl TemplateService {
    /// Creates a new template service.
    pub fn new(templates: Arc<dyn TemplateStore>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { templates, storage }
    }

    /// Create a plain-text template.
    pub async fn create_plain(&self, req: CreatePlainTemplateRequest) -> AppResult<Template> {
        req.validate()?;
        let template = self
            .templates
            .create_template(&CreateTemplate {
                name: req.name.trim().to_string(),
                kind: TemplateKind::Plain,
                body: Some(req.body),
                layout_path: None,
                field_map: None,
            })
            .await?;
        info!(template_id = %template.id, kind = "plain", "Created template");
        Ok(template)
    }

    /// Validate and store a layout template.
    pub async fn create_layout(&self, req: CreateLayoutTemplateRequest) -> AppResult<Template> {
        req.validate()?;
        let layout = std::str::from_utf8(&req.layout)
            .map_err(|_| AppError::validation("Layout file must be UTF-8 text"))?;
        req.field_map.validate(layout)?;

        let path = format!("{TEMPLATE_DIR}/{}.layout", Uuid::now_v7());
        self.storage.write(&path, req.layout.clone()).await?;

        let created = self
            .templates
            .create_template(&CreateTemplate {
                name: req.name.trim().to_string(),
                kind: TemplateKind::Layout,
                body: None,
                layout_path: Some(path.clone()),
                field_map: Some(req.field_map),
            })
            .await;

        match created {
            Ok(template) => {
                info!(template_id = %template.id, kind = "layout", path = %path, "Created template");
                Ok(template)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!(path = %path, error = %cleanup, "Failed to remove orphaned layout file");
                }
                Err(e)
            }
        }
    }

    /// Find a template.
    pub async fn get(&self, id: TemplateId) -> AppResult<Template> {
        self.templates
            .find_template(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Template {id} not found")))
    }

    /// All templates, by name.
    pub async fn list(&self) -> AppResult<Vec<Template>> {
        self.templates.list_templates().await
    }
}
