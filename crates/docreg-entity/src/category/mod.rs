//! Document category entities.

pub mod model;

pub use model::{Category, CreateCategory, DEFAULT_CATEGORIES, SequencePolicy};
