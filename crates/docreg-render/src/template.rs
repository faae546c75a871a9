//! Template substitution.

use std::sync::Arc;

use tracing::debug;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;
use docreg_core::types::RenderedContent;
use docreg_entity::template::{FieldMap, Template, TemplateKind};

use crate::variables::Variables;

/// Fills templates with document variables.
///
/// Plain templates are substituted in place. Layout templates load their
/// layout file from blob storage and fill it through the template's field
/// map.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    storage: Arc<dyn StorageProvider>,
}

impl TemplateRenderer {
    /// Create a renderer reading layout files from `storage`.
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    /// Render `template` with `variables`.
    pub async fn render(
        &self,
        template: &Template,
        variables: &Variables,
    ) -> AppResult<RenderedContent> {
        match template.kind {
            TemplateKind::Plain => {
                let body = template.body.as_deref().ok_or_else(|| {
                    AppError::render(format!("Plain template {} has no body", template.id))
                })?;
                Ok(RenderedContent::Markup {
                    text: substitute_plain(body, variables),
                })
            }
            TemplateKind::Layout => {
                let path = template.layout_path.as_deref().ok_or_else(|| {
                    AppError::render(format!("Layout template {} has no layout file", template.id))
                })?;
                let raw = self.storage.read_bytes(path).await?;
                let layout = String::from_utf8(raw.to_vec()).map_err(|e| {
                    AppError::with_source(
                        docreg_core::error::ErrorKind::Render,
                        format!("Layout file {path} is not valid UTF-8"),
                        e,
                    )
                })?;
                let field_map = template.fields();
                debug!(template_id = %template.id, fields = field_map.len(), "Filling layout");
                Ok(RenderedContent::Layout {
                    text: fill_layout(&layout, &field_map, variables),
                    field_map: field_map.canonical_json()?,
                })
            }
        }
    }
}

/// Replace every `{{ key }}` with its value. Unknown placeholders stay as they are.
///
/// Only the single-space form is recognised, so `{{key}}` is left verbatim.
pub fn substitute_plain(body: &str, variables: &Variables) -> String {
    variables.iter().fold(body.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{ {key} }}}}"), value)
    })
}

/// Replace each mapped placeholder with its field's value, in map order.
///
/// A mapped field with no variable fills its placeholder with an empty string.
pub fn fill_layout(layout: &str, field_map: &FieldMap, variables: &Variables) -> String {
    field_map.iter().fold(layout.to_string(), |text, entry| {
        let value = variables
            .get(&entry.field)
            .map(String::as_str)
            .unwrap_or_default();
        text.replace(&entry.placeholder, value)
    })
}
