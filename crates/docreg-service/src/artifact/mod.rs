//! Generated and uploaded document artifacts.

pub mod attachment;
pub mod cache;

pub use attachment::{AttachmentService, AttachmentUpload};
pub use cache::{ArtifactCache, GeneratedPdf, RenderRequest};
