//! Typed field map for layout templates.
//!
//! A field map says which template variable fills which placeholder token
//! of a layout file. It is validated once, when the template is saved, so
//! rendering never has to decode or second-guess it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use docreg_core::error::AppError;
use docreg_core::result::AppResult;

/// One entry of a field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Template variable name (e.g. `recipient`).
    pub field: String,
    /// Literal token in the layout file replaced by the variable's value.
    pub placeholder: String,
}

/// Ordered mapping from field name to layout placeholder.
///
/// Order is significant: placeholders are filled in map order, and the
/// canonical JSON used for content hashing follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(Vec<FieldMapping>);

impl FieldMap {
    /// Build a field map from `(field, placeholder)` pairs.
    pub fn from_pairs<I, F, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, P)>,
        F: Into<String>,
        P: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(field, placeholder)| FieldMapping {
                    field: field.into(),
                    placeholder: placeholder.into(),
                })
                .collect(),
        )
    }

    /// Iterate the entries in map order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical JSON encoding used as a hashing input.
    pub fn canonical_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate the map against the layout it will fill.
    ///
    /// Field names and placeholders must be non-blank and unique, and every
    /// placeholder must occur in `layout`.
    pub fn validate(&self, layout: &str) -> AppResult<()> {
        if self.0.is_empty() {
            return Err(AppError::validation("Field map must not be empty"));
        }

        let mut fields = HashSet::new();
        let mut placeholders = HashSet::new();
        for entry in &self.0 {
            if entry.field.trim().is_empty() {
                return Err(AppError::validation("Field name must not be blank"));
            }
            if entry.placeholder.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Placeholder for field '{}' must not be blank",
                    entry.field
                )));
            }
            if !fields.insert(entry.field.as_str()) {
                return Err(AppError::validation(format!(
                    "Field '{}' is mapped more than once",
                    entry.field
                )));
            }
            if !placeholders.insert(entry.placeholder.as_str()) {
                return Err(AppError::validation(format!(
                    "Placeholder '{}' is used by more than one field",
                    entry.placeholder
                )));
            }
            if !layout.contains(&entry.placeholder) {
                return Err(AppError::validation(format!(
                    "Placeholder '{}' does not occur in the layout",
                    entry.placeholder
                )));
            }
        }
        Ok(())
    }
}
