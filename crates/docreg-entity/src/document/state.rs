//! Document lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a document.
///
/// The only transition is `Draft -> Final`; a final document is immutable
/// and cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    /// Editable, deletable.
    Draft,
    /// Finalized; no further mutation.
    Final,
}

impl DocumentState {
    /// Derive the state from the persisted `finalized` flag.
    pub fn from_finalized(finalized: bool) -> Self {
        if finalized { Self::Final } else { Self::Draft }
    }

    /// Whether the document may still be updated or deleted.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
