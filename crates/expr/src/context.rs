// SPDX-License-Identifier: MIT

//! Per-execution environment: built-ins, task variables, and step outputs.

use cronplus_core::{TaskId, VariableValue};
use std::collections::HashMap;
use std::path::PathBuf;

/// File metadata exposed to interpolation built-ins and to `file.*` member
/// access in Decision expressions.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub path: PathBuf,
    pub size: u64,
    pub mtime_utc: chrono::DateTime<chrono::Utc>,
}

impl FileMeta {
    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn directory(&self) -> String {
        self.path.parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        self.path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// Per-file, per-pipeline environment: task variables copied
/// in by value, built-ins derived from the matched file and the clock
/// reading taken when the execution started, and an outputs map populated
/// as steps complete. Mutations are visible only to later steps in the same
/// execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub task_id: TaskId,
    pub correlation_id: String,
    pub file: FileMeta,
    pub variables: HashMap<String, VariableValue>,
    pub outputs: HashMap<String, serde_json::Value>,
    now: chrono::DateTime<chrono::Utc>,
}

impl ExecutionContext {
    pub fn new(
        task_id: TaskId,
        correlation_id: String,
        file: FileMeta,
        variables: HashMap<String, VariableValue>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self { task_id, correlation_id, file, variables, outputs: HashMap::new(), now }
    }

    /// Merge one step's outputs into the context under its name. Outputs are
    /// immutable once merged: re-merging the same step name overwrites only
    /// that step's slot, never another step's.
    pub fn merge_outputs(&mut self, step_name: &str, outputs: serde_json::Value) {
        self.outputs.insert(step_name.to_string(), outputs);
    }

    /// Canonical string for a built-in name, or `None` if
    /// `name` isn't one of the recognized built-ins.
    pub fn builtin(&self, name: &str) -> Option<String> {
        Some(match name {
            "fileName" => self.file.name(),
            "filePath" => self.file.path.to_string_lossy().into_owned(),
            "fileDirectory" => self.file.directory(),
            "fileExtension" => self.file.extension(),
            "fileSize" => self.file.size.to_string(),
            "fileMtimeUtc" => self.file.mtime_utc.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            "date" => self.now.format("%Y-%m-%d").to_string(),
            "time" => self.now.format("%H:%M:%S").to_string(),
            "utcNow" => self.now.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            "taskId" => self.task_id.as_str().to_string(),
            "correlationId" => self.correlation_id.clone(),
            _ => return None,
        })
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
