//! Artifact (uploaded or generated file) entities.

pub mod model;

pub use model::{Artifact, ArtifactKind, NewArtifact, PDF_MIME};
