//! Template entities.

pub mod field_map;
pub mod model;

pub use field_map::{FieldMap, FieldMapping};
pub use model::{CreateTemplate, Template, TemplateKind};
