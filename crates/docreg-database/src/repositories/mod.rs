//! PostgreSQL implementations of the store traits.

pub mod artifact;
pub mod category;
pub mod document;
pub mod group;
pub mod sequence;
pub mod template;

pub use artifact::ArtifactRepository;
pub use category::CategoryRepository;
pub use document::DocumentRepository;
pub use group::GroupRepository;
pub use sequence::SequenceRepository;
pub use template::TemplateRepository;

use docreg_core::error::{AppError, ErrorKind};

/// Unique index on `(category_id, group_id, code)`.
pub(crate) const DOCUMENT_CODE_KEY: &str = "documents_code_key";
/// Unique index on `(category_id, group_id, year, sequential)`.
pub(crate) const DOCUMENT_SEQUENCE_KEY: &str = "documents_sequence_key";

/// Map a failed document write, translating unique-index violations into
/// their domain error kinds.
pub(crate) fn document_write_error(e: sqlx::Error, code: Option<&str>, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(DOCUMENT_CODE_KEY) => {
            AppError::duplicate_code(code.unwrap_or_default())
        }
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some(DOCUMENT_SEQUENCE_KEY) =>
        {
            AppError::sequence_conflict("Sequential number already taken in this partition")
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}
