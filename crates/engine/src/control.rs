// SPDX-License-Identifier: MIT

//! Control Facade: the in-process capability set an
//! external transport (HTTP/RPC, a CLI) would sit behind. Out of scope here
//! is the transport itself — this trait is the documented
//! seam.

use crate::manager::SupervisorManager;
use crate::supervisor::TaskView;
use async_trait::async_trait;
use cronplus_core::{CronplusError, ExecutionLogEntry, Task, TaskId};
use cronplus_storage::{DeadLetterEntry, LogFilter};
use std::time::Duration;

/// Structured result for a mutating operation.
#[derive(Debug, Clone)]
pub struct ControlResult {
    pub ok: bool,
    pub message: String,
    pub entity_id: Option<String>,
    pub supervisor_reloaded: Option<bool>,
}

impl ControlResult {
    fn ok(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into(), entity_id: Some(entity_id.into()), supervisor_reloaded: None }
    }

    fn ok_reloaded(entity_id: impl Into<String>, message: impl Into<String>, reloaded: bool) -> Self {
        Self { ok: true, message: message.into(), entity_id: Some(entity_id.into()), supervisor_reloaded: Some(reloaded) }
    }

    fn failed(entity_id: Option<String>, message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into(), entity_id, supervisor_reloaded: None }
    }
}

/// Aggregated counters across every applied task.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub tasks: Vec<TaskView>,
    pub total_processed: u64,
    pub total_failed: u64,
}

#[async_trait]
pub trait ControlFacade: Send + Sync {
    async fn list_tasks(&self) -> Vec<TaskView>;
    async fn get_task(&self, id: &TaskId) -> Option<TaskView>;
    async fn create_task(&self, task: Task, deadline: Duration) -> ControlResult;
    async fn update_task(&self, task: Task, deadline: Duration) -> ControlResult;
    async fn delete_task(&self, id: &TaskId, deadline: Duration) -> ControlResult;
    async fn apply_config(&self, tasks: Vec<Task>, deadline: Duration) -> ControlResult;
    async fn start_task(&self, id: &TaskId, deadline: Duration) -> ControlResult;
    async fn stop_task(&self, id: &TaskId, deadline: Duration) -> ControlResult;
    async fn pause_task(&self, id: &TaskId, deadline: Duration) -> ControlResult;
    async fn resume_task(&self, id: &TaskId, deadline: Duration) -> ControlResult;
    async fn get_status(&self, id: &TaskId) -> Option<TaskView>;
    async fn list_logs(&self, filter: LogFilter, offset: usize, page_size: usize) -> Vec<ExecutionLogEntry>;
    async fn list_dead_letters(&self, task_id: Option<&TaskId>, limit: usize) -> Vec<DeadLetterEntry>;
    async fn get_metrics_snapshot(&self) -> MetricsSnapshot;
}

#[async_trait]
impl ControlFacade for SupervisorManager {
    async fn list_tasks(&self) -> Vec<TaskView> {
        self.snapshot()
    }

    async fn get_task(&self, id: &TaskId) -> Option<TaskView> {
        self.snapshot().into_iter().find(|view| &view.id == id)
    }

    async fn create_task(&self, task: Task, deadline: Duration) -> ControlResult {
        let id = task.id;
        if self.applied_tasks().iter().any(|existing| existing.id == id) {
            return ControlResult::failed(Some(id.to_string()), "task id already exists");
        }
        let mut tasks = self.applied_tasks();
        tasks.push(task);
        match with_deadline(deadline, SupervisorManager::apply_config(self, tasks)).await {
            Some(_) => match self.get(&id) {
                Some(_) => ControlResult::ok(id.to_string(), "task created"),
                None => ControlResult::failed(Some(id.to_string()), "task construction failed, see notStartedReason"),
            },
            None => ControlResult::failed(Some(id.to_string()), "applyConfig exceeded its deadline"),
        }
    }

    async fn update_task(&self, task: Task, deadline: Duration) -> ControlResult {
        let id = task.id;
        let mut tasks = self.applied_tasks();
        let Some(slot) = tasks.iter_mut().find(|existing| existing.id == id) else {
            return ControlResult::failed(Some(id.to_string()), "task not found");
        };
        *slot = task;
        match with_deadline(deadline, self.apply_config(tasks)).await {
            Some(diff) => ControlResult::ok_reloaded(id.to_string(), "task updated", diff.changed.iter().any(|t| t.id == id)),
            None => ControlResult::failed(Some(id.to_string()), "applyConfig exceeded its deadline"),
        }
    }

    async fn delete_task(&self, id: &TaskId, deadline: Duration) -> ControlResult {
        let tasks: Vec<Task> = self.applied_tasks().into_iter().filter(|t| &t.id != id).collect();
        if tasks.len() == self.applied_tasks().len() {
            return ControlResult::failed(Some(id.to_string()), "task not found");
        }
        match with_deadline(deadline, self.apply_config(tasks)).await {
            Some(_) => ControlResult::ok(id.to_string(), "task deleted"),
            None => ControlResult::failed(Some(id.to_string()), "applyConfig exceeded its deadline"),
        }
    }

    async fn apply_config(&self, tasks: Vec<Task>, deadline: Duration) -> ControlResult {
        match with_deadline(deadline, SupervisorManager::apply_config(self, tasks)).await {
            Some(diff) => {
                ControlResult { ok: true, message: format!("applied: {} added, {} changed, {} removed", diff.added.len(), diff.changed.len(), diff.removed.len()), entity_id: None, supervisor_reloaded: Some(!diff.changed.is_empty()) }
            }
            None => ControlResult::failed(None, "applyConfig exceeded its deadline"),
        }
    }

    async fn start_task(&self, id: &TaskId, deadline: Duration) -> ControlResult {
        with_supervisor_result(self, id, deadline, |s| async move { s.start().await }).await
    }

    async fn stop_task(&self, id: &TaskId, deadline: Duration) -> ControlResult {
        let grace = deadline;
        with_supervisor_result(self, id, deadline, move |s| async move { s.stop(grace).await }).await
    }

    async fn pause_task(&self, id: &TaskId, deadline: Duration) -> ControlResult {
        with_supervisor_result(self, id, deadline, |s| async move { s.pause().await }).await
    }

    async fn resume_task(&self, id: &TaskId, deadline: Duration) -> ControlResult {
        with_supervisor_result(self, id, deadline, |s| async move { s.resume().await }).await
    }

    async fn get_status(&self, id: &TaskId) -> Option<TaskView> {
        self.get(id).map(|s| s.view())
    }

    async fn list_logs(&self, filter: LogFilter, offset: usize, page_size: usize) -> Vec<ExecutionLogEntry> {
        self.execution_log().list(&filter, offset, page_size)
    }

    async fn list_dead_letters(&self, task_id: Option<&TaskId>, limit: usize) -> Vec<DeadLetterEntry> {
        self.dead_letter().list(task_id, limit, None)
    }

    async fn get_metrics_snapshot(&self) -> MetricsSnapshot {
        let tasks = self.snapshot();
        let total_processed = tasks.iter().map(|t| t.processed_count).sum();
        let total_failed = tasks.iter().map(|t| t.failed_count).sum();
        MetricsSnapshot { generated_at: chrono::Utc::now(), tasks, total_processed, total_failed }
    }
}

async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Option<T>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(deadline, fut).await.ok()
}

async fn with_supervisor_result<F, Fut>(manager: &SupervisorManager, id: &TaskId, deadline: Duration, op: F) -> ControlResult
where
    F: FnOnce(std::sync::Arc<crate::supervisor::Supervisor>) -> Fut,
    Fut: std::future::Future<Output = Result<(), CronplusError>>,
{
    let Some(supervisor) = manager.get(id) else {
        return ControlResult::failed(Some(id.to_string()), "task not found");
    };
    match with_deadline(deadline, op(supervisor)).await {
        Some(Ok(())) => ControlResult::ok(id.to_string(), "ok"),
        Some(Err(err)) => ControlResult::failed(Some(id.to_string()), err.to_string()),
        None => ControlResult::failed(Some(id.to_string()), "operation exceeded its deadline"),
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
