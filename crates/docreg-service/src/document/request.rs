//! Validated inputs for document create and update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use docreg_core::types::{CategoryId, TemplateId};
use docreg_entity::document::SequenceSlot;

use crate::sequence::ManualSequence;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request to create a document in the active group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    /// Category of the document. Must belong to the active group.
    pub category_id: CategoryId,
    /// Template used for PDF generation.
    pub template_id: Option<TemplateId>,
    /// Sender line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub sender: String,
    /// Recipient line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub recipient: String,
    /// Subject line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub subject: String,
    /// Message body.
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    /// Date printed on the document.
    pub document_date: NaiveDate,
    /// Code prefix. Falls back to the category's prefix when blank.
    #[validate(length(max = 32))]
    pub prefix: Option<String>,
    /// Requested year (manual categories only).
    #[validate(range(min = 1900, max = 9999))]
    pub year: Option<i32>,
    /// Requested sequential (manual categories only).
    #[validate(range(min = 1))]
    pub sequential: Option<i32>,
    /// Explicit code (manual categories only).
    #[validate(length(max = 64))]
    pub code: Option<String>,
}

impl CreateDocumentRequest {
    /// The manual sequencing fields of this request.
    pub fn manual_sequence(&self) -> ManualSequence {
        ManualSequence {
            year: self.year,
            sequential: self.sequential,
            code: self.code.clone(),
        }
    }
}

/// Request to update a draft document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    /// Template used for PDF generation.
    pub template_id: Option<TemplateId>,
    /// Sender line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub sender: String,
    /// Recipient line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub recipient: String,
    /// Subject line.
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub subject: String,
    /// Message body.
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    /// Date printed on the document.
    pub document_date: NaiveDate,
    /// Code prefix. Falls back to the category's prefix when blank.
    #[validate(length(max = 32))]
    pub prefix: Option<String>,
    /// Requested year (manual categories only).
    #[validate(range(min = 1900, max = 9999))]
    pub year: Option<i32>,
    /// Requested sequential (manual categories only).
    #[validate(range(min = 1))]
    pub sequential: Option<i32>,
    /// Explicit code (manual categories only).
    #[validate(length(max = 64))]
    pub code: Option<String>,
}

impl UpdateDocumentRequest {
    /// The manual sequencing fields of this request laid over `stored`.
    ///
    /// Omitted fields keep their stored values. The stored code is kept
    /// unless the request names a code or supplies both year and sequential.
    pub fn manual_sequence(&self, stored: &SequenceSlot) -> ManualSequence {
        let code = match self.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(code.to_string()),
            _ if self.year.is_some() && self.sequential.is_some() => None,
            _ => stored.code.clone(),
        };
        ManualSequence {
            year: self.year.or(stored.year),
            sequential: self.sequential.or(stored.sequential),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateDocumentRequest {
        CreateDocumentRequest {
            category_id: CategoryId::new(),
            template_id: None,
            sender: "Board".into(),
            recipient: "Staff".into(),
            subject: "Notice".into(),
            body: "Body".into(),
            document_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            prefix: None,
            year: None,
            sequential: None,
            code: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut req = request();
        req.subject = "   ".into();
        req.sequential = Some(0);
        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("subject"));
        assert!(fields.contains_key("sequential"));
    }

    fn update() -> UpdateDocumentRequest {
        UpdateDocumentRequest {
            template_id: None,
            sender: "Board".into(),
            recipient: "Staff".into(),
            subject: "Notice".into(),
            body: "Body".into(),
            document_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            prefix: None,
            year: None,
            sequential: None,
            code: None,
        }
    }

    fn stored() -> SequenceSlot {
        SequenceSlot {
            year: Some(2023),
            sequential: Some(7),
            code: Some("X-1".into()),
            managed: false,
        }
    }

    #[test]
    fn test_update_keeps_stored_fields_when_omitted() {
        let manual = update().manual_sequence(&stored());
        assert_eq!(manual.year, Some(2023));
        assert_eq!(manual.sequential, Some(7));
        assert_eq!(manual.code.as_deref(), Some("X-1"));
    }

    #[test]
    fn test_update_partial_fields_keep_stored_code() {
        let mut req = update();
        req.sequential = Some(9);
        req.code = Some("  ".into());
        let manual = req.manual_sequence(&stored());
        assert_eq!(manual.year, Some(2023));
        assert_eq!(manual.sequential, Some(9));
        assert_eq!(manual.code.as_deref(), Some("X-1"));
    }

    #[test]
    fn test_update_year_and_sequential_resynthesize_code() {
        let mut req = update();
        req.year = Some(2024);
        req.sequential = Some(3);
        let manual = req.manual_sequence(&stored());
        assert_eq!(manual.code, None);
        assert_eq!((manual.year, manual.sequential), (Some(2024), Some(3)));
    }
}
