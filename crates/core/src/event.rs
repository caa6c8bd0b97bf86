// SPDX-License-Identifier: MIT

//! Cross-component event types.

use crate::supervisor_state::SupervisorState;
use crate::task::{ChangeKind, TaskId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A filesystem change observed and stabilized by the Watcher (C2),
/// handed to the Pipeline Executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEvent {
    pub task_id: TaskId,
    pub path: PathBuf,
    pub change_kind: ChangeKind,
    pub detected_at: chrono::DateTime<chrono::Utc>,
}

/// Non-fatal or fatal condition raised by a Watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherError {
    pub task_id: TaskId,
    pub message: String,
    /// Whether this error caused the watcher itself to stop.
    pub watcher_stopped: bool,
}

/// Broadcast on every [`SupervisorState`] transition, consumed
/// by the Supervisor Manager and the Control Facade for snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChanged {
    pub task_id: TaskId,
    pub from: SupervisorState,
    pub to: SupervisorState,
    pub reason: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
