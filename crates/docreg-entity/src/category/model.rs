//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docreg_core::types::{CategoryId, GroupId};

/// Categories every new group starts with: (name, prefix). Both use the
/// managed sequencing policy.
pub const DEFAULT_CATEGORIES: [(&str, &str); 2] = [("Memorando", "MEM"), ("Ofício", "OFC")];

/// A kind of document within a group (e.g. memo, official letter).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// The group this category belongs to.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Prefix used when formatting document codes.
    pub prefix: String,
    /// Whether the server assigns year/sequential/code for this category.
    pub sequence_managed: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// The sequencing policy selected by this category's flag.
    pub fn policy(&self) -> SequencePolicy {
        if self.sequence_managed {
            SequencePolicy::Managed
        } else {
            SequencePolicy::Manual
        }
    }
}

/// How a category's documents receive their year, sequential, and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencePolicy {
    /// Server-assigned from the per-partition counter.
    Managed,
    /// Caller-supplied, subject to code uniqueness.
    Manual,
}

/// Data required to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// The owning group.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Code prefix.
    pub prefix: String,
    /// Sequencing policy flag.
    pub sequence_managed: bool,
}
