//! Code sequencing configuration.

use serde::{Deserialize, Serialize};

/// Settings for sequential code allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencingConfig {
    /// How many times a managed create re-allocates a sequential after the
    /// store rejects the slot before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}
