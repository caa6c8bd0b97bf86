// SPDX-License-Identifier: MIT

//! Supervisor Manager: single-writer map of `TaskId ->
//! Arc<Supervisor>`, plus a pure config-diffing function unit-testable
//! without constructing real Supervisors (teacher precedent:
//! `oj-daemon::lifecycle::reconcile` separates "what should exist" from
//! "how we get there" the same way).

use crate::supervisor::{Supervisor, TaskView};
use cronplus_actions::ActionRegistry;
use cronplus_config::EngineConfig;
use cronplus_core::{CronplusError, Task, TaskId};
use cronplus_storage::{DeadLetterQueue, ExecutionLogStore, StateStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Result of diffing the applied task list against a new one.
/// A pure function over two `Vec<Task>`, so it is unit-testable on its own.
#[derive(Debug, Clone, Default)]
pub struct ConfigDiff {
    /// Tasks present in the old set but absent, or now disabled, in the new one.
    pub removed: Vec<TaskId>,
    /// Tasks present in the new set but absent, or newly enabled, in the old one.
    pub added: Vec<Task>,
    /// Tasks present in both, enabled in both, whose watch spec or pipeline changed.
    pub changed: Vec<Task>,
}

impl ConfigDiff {
    pub fn compute(previous: &[Task], next: &[Task]) -> Self {
        let previous_by_id: HashMap<TaskId, &Task> = previous.iter().map(|t| (t.id, t)).collect();
        let next_by_id: HashMap<TaskId, &Task> = next.iter().map(|t| (t.id, t)).collect();

        let mut removed = Vec::new();
        for task in previous {
            match next_by_id.get(&task.id) {
                None => removed.push(task.id),
                Some(updated) if !updated.enabled && task.enabled => removed.push(task.id),
                Some(_) => {}
            }
        }

        let mut added = Vec::new();
        let mut changed = Vec::new();
        for task in next {
            if !task.enabled {
                continue;
            }
            match previous_by_id.get(&task.id) {
                None => added.push(task.clone()),
                Some(prior) if !prior.enabled => added.push(task.clone()),
                Some(prior) if task_definition_changed(prior, task) => changed.push(task.clone()),
                Some(_) => {}
            }
        }

        Self { removed, added, changed }
    }
}

fn task_definition_changed(a: &Task, b: &Task) -> bool {
    serde_json::to_value(&a.watch).ok() != serde_json::to_value(&b.watch).ok()
        || serde_json::to_value(&a.pipeline).ok() != serde_json::to_value(&b.pipeline).ok()
        || serde_json::to_value(&a.variables).ok() != serde_json::to_value(&b.variables).ok()
        || a.concurrency != b.concurrency
}

/// Holds the current applied configuration and the set of live Supervisors,
/// keyed by `TaskId`.
pub struct SupervisorManager {
    supervisors: RwLock<HashMap<TaskId, Arc<Supervisor>>>,
    applied_tasks: RwLock<Vec<Task>>,
    not_started_reasons: RwLock<HashMap<TaskId, String>>,
    runtime_default_concurrency: usize,
    cancellation_grace: Duration,
    state_store: Arc<StateStore>,
    dead_letter: Arc<DeadLetterQueue>,
    execution_log: Arc<ExecutionLogStore>,
    registry: Arc<ActionRegistry>,
}

impl SupervisorManager {
    pub fn new(
        runtime_default_concurrency: usize,
        cancellation_grace: Duration,
        state_store: Arc<StateStore>,
        dead_letter: Arc<DeadLetterQueue>,
        execution_log: Arc<ExecutionLogStore>,
        registry: Arc<ActionRegistry>,
    ) -> Self {
        Self {
            supervisors: RwLock::new(HashMap::new()),
            applied_tasks: RwLock::new(Vec::new()),
            not_started_reasons: RwLock::new(HashMap::new()),
            runtime_default_concurrency,
            cancellation_grace,
            state_store,
            dead_letter,
            execution_log,
            registry,
        }
    }

    pub fn from_config(config: &EngineConfig, state_store: Arc<StateStore>, dead_letter: Arc<DeadLetterQueue>, execution_log: Arc<ExecutionLogStore>, registry: Arc<ActionRegistry>) -> Self {
        Self::new(
            config.runtime.default_concurrency,
            Duration::from_millis(config.runtime.cancellation_grace_milliseconds),
            state_store,
            dead_letter,
            execution_log,
            registry,
        )
    }

    /// Computes a diff against the currently-applied task list and converges
    /// live Supervisors to match. Construction failures are
    /// recorded per-task and never fail the whole apply.
    pub async fn apply_config(&self, new_tasks: Vec<Task>) -> ConfigDiff {
        let previous = self.applied_tasks.read().clone();
        let diff = ConfigDiff::compute(&previous, &new_tasks);

        for task_id in &diff.removed {
            self.stop_and_drop(*task_id).await;
        }

        for task in &diff.added {
            self.construct_and_start(task.clone()).await;
        }

        for task in &diff.changed {
            self.reload_task(task.clone()).await;
        }

        *self.applied_tasks.write() = new_tasks;
        diff
    }

    async fn construct_and_start(&self, task: Task) {
        let task_id = task.id;
        let supervisor = Supervisor::new(
            task,
            self.runtime_default_concurrency,
            Arc::clone(&self.state_store),
            Arc::clone(&self.dead_letter),
            Arc::clone(&self.execution_log),
            Arc::clone(&self.registry),
        );

        if let Err(err) = supervisor.initialize().await {
            self.not_started_reasons.write().insert(task_id, err.to_string());
            warn!(task_id = %task_id, error = %err, "task failed to initialize, not started");
            return;
        }
        if let Err(err) = supervisor.start().await {
            self.not_started_reasons.write().insert(task_id, err.to_string());
            warn!(task_id = %task_id, error = %err, "task failed to start, not started");
            return;
        }

        self.not_started_reasons.write().remove(&task_id);
        self.supervisors.write().insert(task_id, supervisor);
        info!(task_id = %task_id, "task started");
    }

    async fn reload_task(&self, task: Task) {
        let task_id = task.id;
        let existing = self.supervisors.read().get(&task_id).cloned();
        match existing {
            Some(supervisor) => {
                if let Err(err) = supervisor.reload(task).await {
                    warn!(task_id = %task_id, error = %err, "task reload failed");
                }
            }
            None => self.construct_and_start(task).await,
        }
    }

    async fn stop_and_drop(&self, task_id: TaskId) {
        self.not_started_reasons.write().remove(&task_id);
        let supervisor = self.supervisors.write().remove(&task_id);
        if let Some(supervisor) = supervisor {
            if let Err(err) = supervisor.stop(self.cancellation_grace).await {
                warn!(task_id = %task_id, error = %err, "error stopping task");
            }
            info!(task_id = %task_id, "task stopped and dropped");
        }
    }

    pub fn get(&self, task_id: &TaskId) -> Option<Arc<Supervisor>> {
        self.supervisors.read().get(task_id).cloned()
    }

    pub fn applied_tasks(&self) -> Vec<Task> {
        self.applied_tasks.read().clone()
    }

    pub fn execution_log(&self) -> &ExecutionLogStore {
        &self.execution_log
    }

    pub fn dead_letter(&self) -> &DeadLetterQueue {
        &self.dead_letter
    }

    /// Ordered list of `TaskView`s for every currently-applied task,
    /// including not-started ones the Manager only knows about indirectly.
    pub fn snapshot(&self) -> Vec<TaskView> {
        let applied = self.applied_tasks.read();
        let supervisors = self.supervisors.read();
        let not_started_reasons = self.not_started_reasons.read();
        applied
            .iter()
            .map(|task| match supervisors.get(&task.id) {
                Some(supervisor) => supervisor.view(),
                None => TaskView {
                    id: task.id,
                    enabled: task.enabled,
                    watch_directory: task.watch.directory.clone(),
                    watch_glob: task.watch.glob_pattern.clone(),
                    concurrency: task.effective_concurrency(self.runtime_default_concurrency),
                    state: cronplus_core::SupervisorState::Stopped,
                    processed_count: 0,
                    failed_count: 0,
                    last_activity_at: None,
                    last_error: None,
                    not_started_reason: Some(
                        not_started_reasons.get(&task.id).cloned().unwrap_or_else(|| "not started".to_string()),
                    ),
                },
            })
            .collect()
    }

    /// Re-converges live supervisors to the stored config, protecting
    /// against missed state-change notifications. Intended to
    /// run on a periodic timer from the CLI process entry point.
    pub async fn reconcile(&self) {
        let applied = self.applied_tasks.read().clone();
        let diff = ConfigDiff::compute(&[], &applied);
        for task in diff.added {
            if self.supervisors.read().contains_key(&task.id) {
                continue;
            }
            warn!(task_id = %task.id, "reconciliation: task missing a live supervisor, restarting");
            self.construct_and_start(task).await;
        }
    }

    /// Stops every live supervisor; intended for process shutdown.
    pub async fn stop_all(&self) {
        let task_ids: Vec<TaskId> = self.supervisors.read().keys().copied().collect();
        for task_id in task_ids {
            self.stop_and_drop(task_id).await;
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
