// SPDX-License-Identifier: MIT

//! Task and watch-spec data model.

use crate::step::Step;
use crate::variable::Variable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Stable, unique identifier for a configured task.
    pub struct TaskId("tsk-");
}

/// Filesystem change kinds a watch spec can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Changed,
    Renamed,
    Deleted,
}

crate::simple_display! {
    ChangeKind {
        Created => "created",
        Changed => "changed",
        Renamed => "renamed",
        Deleted => "deleted",
    }
}

/// Watch specification for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSpec {
    pub directory: PathBuf,
    pub glob_pattern: String,
    #[serde(default)]
    pub include_subdirectories: bool,
    #[serde(default = "WatchSpec::default_debounce_ms")]
    pub debounce_milliseconds: u64,
    #[serde(default = "WatchSpec::default_stabilization_ms")]
    pub stabilization_milliseconds: u64,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub extension_whitelist: Vec<String>,
    #[serde(default)]
    pub min_file_size_bytes: Option<u64>,
    #[serde(default)]
    pub max_file_size_bytes: Option<u64>,
    #[serde(default = "WatchSpec::default_change_kinds")]
    pub watched_change_kinds: Vec<ChangeKind>,
}

impl WatchSpec {
    fn default_debounce_ms() -> u64 {
        500
    }

    fn default_stabilization_ms() -> u64 {
        500
    }

    fn default_change_kinds() -> Vec<ChangeKind> {
        vec![ChangeKind::Created, ChangeKind::Changed, ChangeKind::Renamed]
    }

    /// Poll interval for stabilization sampling: `max(debounce/4, 50ms)`.
    pub fn stabilization_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis((self.debounce_milliseconds / 4).max(50))
    }
}

/// A configured task: watch + pipeline + variables + concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default = "Task::default_enabled")]
    pub enabled: bool,
    pub watch: WatchSpec,
    pub pipeline: Vec<Step>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub concurrency: Option<std::num::NonZeroUsize>,
}

impl Task {
    fn default_enabled() -> bool {
        true
    }

    /// Effective concurrency: the task's own setting, or the runtime default.
    pub fn effective_concurrency(&self, runtime_default: usize) -> usize {
        self.concurrency.map(|n| n.get()).unwrap_or(runtime_default).max(1)
    }

    /// Bounded worker-channel capacity for this task: `max(64, 4*concurrency)`.
    pub fn channel_capacity(&self, runtime_default: usize) -> usize {
        (4 * self.effective_concurrency(runtime_default)).max(64)
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        set {
            enabled: bool = true,
            pipeline: Vec<Step> = Vec::new(),
            variables: Vec<Variable> = Vec::new(),
        }
        option {
            concurrency: std::num::NonZeroUsize = None,
        }
        computed {
            id: TaskId = TaskId::new(),
            watch: WatchSpec = WatchSpec {
                directory: PathBuf::from("/tmp/cronplus-in"),
                glob_pattern: "*".to_string(),
                include_subdirectories: false,
                debounce_milliseconds: 500,
                stabilization_milliseconds: 500,
                exclude_patterns: Vec::new(),
                extension_whitelist: Vec::new(),
                min_file_size_bytes: None,
                max_file_size_bytes: None,
                watched_change_kinds: WatchSpec::default_change_kinds(),
            },
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
