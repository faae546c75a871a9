//! Document entities.

pub mod model;
pub mod sequence;
pub mod state;

pub use model::{Document, NewDocument};
pub use sequence::{SequenceKey, SequenceSlot};
pub use state::DocumentState;
