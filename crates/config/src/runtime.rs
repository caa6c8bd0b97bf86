// SPDX-License-Identifier: MIT

//! Runtime section of configuration: the knobs that apply to
//! the engine as a whole rather than to any single task.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "RuntimeConfig::default_concurrency")]
    pub default_concurrency: usize,
    pub state_store_location: PathBuf,
    pub dead_letter_location: PathBuf,
    #[serde(default = "RuntimeConfig::default_cancellation_grace_ms")]
    pub cancellation_grace_milliseconds: u64,
}

impl RuntimeConfig {
    fn default_concurrency() -> usize {
        4
    }

    fn default_cancellation_grace_ms() -> u64 {
        5_000
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_concurrency: Self::default_concurrency(),
            state_store_location: PathBuf::from("cronplus-state.db"),
            dead_letter_location: PathBuf::from("cronplus-dead-letter.db"),
            cancellation_grace_milliseconds: Self::default_cancellation_grace_ms(),
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
