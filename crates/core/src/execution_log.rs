// SPDX-License-Identifier: MIT

//! Append-mostly visibility log: not required for correctness,
//! used by snapshot/log consumers.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
}

crate::simple_display! {
    ExecutionStatus {
        Running => "Running",
        Success => "Success",
        Failed => "Failed",
    }
}

/// Detail for one executed step, surfaced in `stepDetails`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDetail {
    pub name: String,
    pub outcome: String,
    pub attempts: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// One execution-log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub id: u64,
    pub task_id: TaskId,
    pub file_path: PathBuf,
    pub status: ExecutionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub step_details: Vec<StepDetail>,
}

#[cfg(test)]
#[path = "execution_log_tests.rs"]
mod tests;
