//! # docreg-render
//!
//! Turns a template and a document's variables into deterministic
//! [`RenderedContent`], hashes that content for the artifact cache, and
//! composes PDFs with `genpdf`.

pub mod hash;
pub mod pdf;
pub mod template;
pub mod variables;

pub use docreg_core::types::RenderedContent;
pub use hash::{content_hash, generated_path};
pub use pdf::GenPdfRenderer;
pub use template::TemplateRenderer;
pub use variables::{Variables, document_variables};
