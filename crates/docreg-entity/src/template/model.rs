//! Template entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use docreg_core::types::TemplateId;

use super::field_map::FieldMap;

/// How a template's content is stored and filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "template_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Plain-text body with `{{ key }}` placeholders.
    Plain,
    /// Layout file in blob storage filled through a field map.
    Layout,
}

impl TemplateKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Layout => "layout",
        }
    }
}

/// A document template shared by all groups.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    /// Unique template identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Plain or layout.
    pub kind: TemplateKind,
    /// Body text for plain templates.
    pub body: Option<String>,
    /// Blob storage path of the layout file for layout templates.
    pub layout_path: Option<String>,
    /// Field-name-to-placeholder mapping for layout templates.
    pub field_map: Option<Json<FieldMap>>,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// The field map, or an empty one for plain templates.
    pub fn fields(&self) -> FieldMap {
        self.field_map
            .as_ref()
            .map(|json| json.0.clone())
            .unwrap_or_default()
    }
}

/// Data required to create a new template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    /// Display name.
    pub name: String,
    /// Plain or layout.
    pub kind: TemplateKind,
    /// Body text (plain templates).
    pub body: Option<String>,
    /// Layout file path (layout templates).
    pub layout_path: Option<String>,
    /// Field map (layout templates).
    pub field_map: Option<FieldMap>,
}
