//! [`CodeSequencer`]: year, sequential, and code assignment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::types::{CategoryId, DocumentId, GroupId};
use docreg_database::{DocumentStore, SequenceStore};
use docreg_entity::document::{Document, SequenceKey, SequenceSlot};

use super::code::DocumentCode;

/// What to do when a manual code is already taken in its partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the document but drop the code.
    Degrade,
    /// Fail with `DuplicateCode`.
    Reject,
}

/// Caller-supplied sequencing fields for manual categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualSequence {
    /// Requested year.
    pub year: Option<i32>,
    /// Requested sequential.
    pub sequential: Option<i32>,
    /// Explicit code. Takes precedence over a synthesized one.
    pub code: Option<String>,
}

/// Computes sequencing fields under the managed and manual policies.
#[derive(Debug, Clone)]
pub struct CodeSequencer {
    documents: Arc<dyn DocumentStore>,
    sequences: Arc<dyn SequenceStore>,
}

impl CodeSequencer {
    /// Creates a new sequencer.
    pub fn new(documents: Arc<dyn DocumentStore>, sequences: Arc<dyn SequenceStore>) -> Self {
        Self {
            documents,
            sequences,
        }
    }

    /// Allocate the next managed slot of `(category, group, year)`.
    pub async fn allocate(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        prefix: &str,
        year: i32,
    ) -> AppResult<SequenceSlot> {
        let key = SequenceKey::new(category_id, group_id, year);
        let sequential = self.sequences.next_sequential(&key).await?;
        let code = DocumentCode::format(prefix, sequential, year);
        debug!(%category_id, %group_id, year, sequential, code = %code, "Allocated managed code");
        Ok(SequenceSlot {
            year: Some(year),
            sequential: Some(sequential),
            code: Some(code),
            managed: true,
        })
    }

    /// Recompute a managed slot for an existing document.
    ///
    /// The document's sequential and year are kept when both are set;
    /// otherwise a fresh sequential is allocated in the document's year,
    /// or in `year` when it has none. The resulting
    /// code must not be held by another document of the partition.
    pub async fn reassign(
        &self,
        document: &Document,
        prefix: &str,
        year: i32,
    ) -> AppResult<SequenceSlot> {
        let slot = match (document.year, document.sequential) {
            (Some(year), Some(sequential)) => SequenceSlot {
                year: Some(year),
                sequential: Some(sequential),
                code: Some(DocumentCode::format(prefix, sequential, year)),
                managed: true,
            },
            (stored_year, _) => {
                let year = stored_year.unwrap_or(year);
                self.allocate(document.category_id, document.group_id, prefix, year)
                    .await?
            }
        };

        if let Some(code) = slot.code.as_deref() {
            let taken = self
                .documents
                .code_exists(
                    document.category_id,
                    document.group_id,
                    code,
                    Some(document.id),
                )
                .await?;
            if taken {
                return Err(AppError::duplicate_code(code));
            }
        }
        Ok(slot)
    }

    /// Resolve caller-supplied fields under the manual policy.
    ///
    /// An explicit code wins; otherwise a code is synthesized from `prefix`
    /// when both year and sequential are given. Either way the code is
    /// checked against the partition and handled per `policy` when taken.
    pub async fn manual(
        &self,
        category_id: CategoryId,
        group_id: GroupId,
        prefix: &str,
        requested: &ManualSequence,
        excluding: Option<DocumentId>,
        policy: DuplicatePolicy,
    ) -> AppResult<SequenceSlot> {
        let explicit = requested
            .code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);
        let candidate = explicit.or_else(|| match (requested.year, requested.sequential) {
            (Some(year), Some(sequential)) => Some(DocumentCode::format(prefix, sequential, year)),
            _ => None,
        });

        let code = match candidate {
            Some(code) => {
                let taken = self
                    .documents
                    .code_exists(category_id, group_id, &code, excluding)
                    .await?;
                match (taken, policy) {
                    (false, _) => Some(code),
                    (true, DuplicatePolicy::Degrade) => {
                        warn!(%category_id, %group_id, code = %code, "Duplicate code dropped");
                        None
                    }
                    (true, DuplicatePolicy::Reject) => {
                        return Err(AppError::duplicate_code(&code));
                    }
                }
            }
            None => None,
        };

        Ok(SequenceSlot {
            year: requested.year,
            sequential: requested.sequential,
            code,
            managed: false,
        })
    }
}
