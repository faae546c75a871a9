//! Document code sequencing.

pub mod code;
pub mod sequencer;

pub use code::DocumentCode;
pub use sequencer::{CodeSequencer, DuplicatePolicy, ManualSequence};
