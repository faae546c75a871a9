//! Rendered template output handed to the PDF backend.

use serde::{Deserialize, Serialize};

/// The deterministic output of template rendering.
///
/// Identical template + variables always produce an identical value,
/// which is what the artifact content hash is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedContent {
    /// A file-based layout with every mapped placeholder filled in.
    Layout {
        /// The filled layout text.
        text: String,
        /// Canonical JSON of the field map the layout was filled with.
        field_map: String,
    },
    /// A plain-text body with `{{ key }}` placeholders substituted.
    Markup {
        /// The substituted body.
        text: String,
    },
}

impl RenderedContent {
    /// The rendered text, regardless of template kind.
    pub fn text(&self) -> &str {
        match self {
            Self::Layout { text, .. } | Self::Markup { text } => text,
        }
    }

    /// Whether this content came from a file-based layout.
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout { .. })
    }
}
