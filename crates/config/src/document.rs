// SPDX-License-Identifier: MIT

//! The full configuration document: a runtime section plus the list of
//! tasks.

use crate::runtime::RuntimeConfig;
use cronplus_core::Task;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
