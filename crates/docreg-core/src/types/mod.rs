//! Core type definitions used across the DocReg workspace.

pub mod content;
pub mod id;

pub use content::RenderedContent;
pub use id::*;
