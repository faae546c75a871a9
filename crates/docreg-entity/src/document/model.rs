//! Document entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docreg_core::types::{CategoryId, DocumentId, GroupId, TemplateId, UserId};

use super::sequence::{SequenceKey, SequenceSlot};
use super::state::DocumentState;

/// An organizational document (memo, official letter, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Owning group.
    pub group_id: GroupId,
    /// Category within the group.
    pub category_id: CategoryId,
    /// Template used for PDF generation, if any.
    pub template_id: Option<TemplateId>,
    /// User who created the document.
    pub created_by: UserId,
    /// Sender line.
    pub sender: String,
    /// Recipient line.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Date printed on the document.
    pub document_date: NaiveDate,
    /// Sequencing year.
    pub year: Option<i32>,
    /// Sequential number within (category, group, year).
    pub sequential: Option<i32>,
    /// Human-readable code, unique within (category, group).
    pub code: Option<String>,
    /// Whether the sequencing fields were assigned by the managed policy.
    pub sequence_managed: bool,
    /// Whether the document has been finalized.
    pub finalized: bool,
    /// When the document was finalized.
    pub finalized_at: Option<DateTime<Utc>>,
    /// Who finalized the document.
    pub finalized_by: Option<UserId>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Current lifecycle state.
    pub fn state(&self) -> DocumentState {
        DocumentState::from_finalized(self.finalized)
    }

    /// The sequencing partition, once a year is assigned.
    pub fn sequence_key(&self) -> Option<SequenceKey> {
        self.year
            .map(|year| SequenceKey::new(self.category_id, self.group_id, year))
    }

    /// The current sequencing fields.
    pub fn slot(&self) -> SequenceSlot {
        SequenceSlot {
            year: self.year,
            sequential: self.sequential,
            code: self.code.clone(),
            managed: self.sequence_managed,
        }
    }

    /// Overwrite the sequencing fields.
    pub fn apply_slot(&mut self, slot: SequenceSlot) {
        self.year = slot.year;
        self.sequential = slot.sequential;
        self.code = slot.code;
        self.sequence_managed = slot.managed;
    }
}

/// Data required to insert a new document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Owning group.
    pub group_id: GroupId,
    /// Category within the group.
    pub category_id: CategoryId,
    /// Template for PDF generation.
    pub template_id: Option<TemplateId>,
    /// Creating user.
    pub created_by: UserId,
    /// Sender line.
    pub sender: String,
    /// Recipient line.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Date printed on the document.
    pub document_date: NaiveDate,
    /// Sequencing fields.
    pub slot: SequenceSlot,
}
