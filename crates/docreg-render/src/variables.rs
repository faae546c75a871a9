//! The variable set a document exposes to its template.

use std::collections::BTreeMap;

use docreg_entity::document::Document;

/// Template variables keyed by name. Ordered so iteration is deterministic.
pub type Variables = BTreeMap<String, String>;

/// Date format printed in templates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Build the fixed variable set for `document`.
///
/// Keys: `code` (empty until assigned), `sender`, `recipient`, `date`,
/// `subject`, `body`.
pub fn document_variables(document: &Document) -> Variables {
    let mut vars = Variables::new();
    vars.insert("code".into(), document.code.clone().unwrap_or_default());
    vars.insert("sender".into(), document.sender.clone());
    vars.insert("recipient".into(), document.recipient.clone());
    vars.insert(
        "date".into(),
        document.document_date.format(DATE_FORMAT).to_string(),
    );
    vars.insert("subject".into(), document.subject.clone());
    vars.insert("body".into(), document.body.clone());
    vars
}
