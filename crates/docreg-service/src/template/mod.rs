//! Shared document templates.

pub mod service;

pub use service::{CreateLayoutTemplateRequest, CreatePlainTemplateRequest, TemplateService};
