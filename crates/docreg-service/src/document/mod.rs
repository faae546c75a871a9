//! Document lifecycle.

pub mod request;
pub mod service;

pub use request::{CreateDocumentRequest, UpdateDocumentRequest};
pub use service::{DocumentDetail, DocumentService};
