//! In-process store used by tests and by the CLI's `--memory` mode.

mod store;

pub use store::MemoryStore;
