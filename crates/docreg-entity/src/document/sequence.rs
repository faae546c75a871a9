//! Sequencing partition and assignment values.

use serde::{Deserialize, Serialize};

use docreg_core::types::{CategoryId, GroupId};

/// The (category, group, year) partition a sequential number is unique in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceKey {
    /// Category of the partition.
    pub category_id: CategoryId,
    /// Group of the partition.
    pub group_id: GroupId,
    /// Calendar year of the partition.
    pub year: i32,
}

impl SequenceKey {
    /// Create a new partition key.
    pub fn new(category_id: CategoryId, group_id: GroupId, year: i32) -> Self {
        Self {
            category_id,
            group_id,
            year,
        }
    }
}

/// The sequencing fields assigned to a document.
///
/// Every field is optional: manual categories may set any subset, and a
/// duplicate code degrades to `code: None` on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSlot {
    /// Document year.
    pub year: Option<i32>,
    /// Sequential number within the partition.
    pub sequential: Option<i32>,
    /// Formatted or caller-supplied code.
    pub code: Option<String>,
    /// Whether the managed policy produced these values.
    pub managed: bool,
}
