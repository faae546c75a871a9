//! Organizational group entities.

pub mod model;

pub use model::{CreateGroup, Group};
