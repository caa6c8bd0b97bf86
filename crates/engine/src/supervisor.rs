// SPDX-License-Identifier: MIT

//! Task Supervisor: owns one Task's Watcher and a bounded
//! worker pool, driving [`SupervisorState`] through the adjacency list
//! validated in `cronplus_core::supervisor_state`.

use crate::executor::{self, ExecutionOutcome};
use cronplus_actions::ActionRegistry;
use cronplus_core::{CronplusError, StateChanged, SupervisorState, SystemClock, Task, TaskId};
use cronplus_storage::{DeadLetterQueue, ExecutionLogStore, StateStore};
use cronplus_watch::{EventSender, WatcherHandle};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STATE_CHANGE_CHANNEL_CAPACITY: usize = 64;
const WATCHER_ERROR_CHANNEL_CAPACITY: usize = 16;
const MAX_WATCHER_BACKOFF: Duration = Duration::from_secs(60);

/// A point-in-time view of a Supervisor, for `snapshot()`/`getStatus`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub enabled: bool,
    pub watch_directory: std::path::PathBuf,
    pub watch_glob: String,
    pub concurrency: usize,
    pub state: SupervisorState,
    pub processed_count: u64,
    pub failed_count: u64,
    pub last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_error: Option<String>,
    pub not_started_reason: Option<String>,
}

/// Live resources for a running Supervisor. The watcher can be replaced in
/// place on restart since it always emits onto
/// the same `event_tx` the worker pool already shares.
struct RunningHandles {
    event_tx: EventSender,
    error_tx: mpsc::Sender<CronplusError>,
    watcher: WatcherHandle,
    workers_cancel: CancellationToken,
    workers: Vec<tokio::task::JoinHandle<()>>,
    watcher_supervisor: tokio::task::JoinHandle<()>,
}

/// Owns one Task's lifecycle. Always used behind an `Arc` so its background
/// tasks (worker pool, watcher-restart loop) can call back into `&self`.
pub struct Supervisor {
    task: RwLock<Task>,
    runtime_default_concurrency: usize,
    state: RwLock<SupervisorState>,
    active_workers: AtomicUsize,
    processed_count: AtomicU64,
    failed_count: AtomicU64,
    last_activity_at: RwLock<Option<chrono::DateTime<chrono::Utc>>>,
    last_error: RwLock<Option<String>>,
    not_started_reason: RwLock<Option<String>>,
    state_changes: broadcast::Sender<StateChanged>,
    running: tokio::sync::Mutex<Option<RunningHandles>>,
    state_store: Arc<StateStore>,
    dead_letter: Arc<DeadLetterQueue>,
    execution_log: Arc<ExecutionLogStore>,
    registry: Arc<ActionRegistry>,
}

impl Supervisor {
    pub fn new(
        task: Task,
        runtime_default_concurrency: usize,
        state_store: Arc<StateStore>,
        dead_letter: Arc<DeadLetterQueue>,
        execution_log: Arc<ExecutionLogStore>,
        registry: Arc<ActionRegistry>,
    ) -> Arc<Self> {
        let (state_changes, _) = broadcast::channel(STATE_CHANGE_CHANNEL_CAPACITY);
        Arc::new(Self {
            task: RwLock::new(task),
            runtime_default_concurrency,
            state: RwLock::new(SupervisorState::Created),
            active_workers: AtomicUsize::new(0),
            processed_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            last_activity_at: RwLock::new(None),
            last_error: RwLock::new(None),
            not_started_reason: RwLock::new(None),
            state_changes,
            running: tokio::sync::Mutex::new(None),
            state_store,
            dead_letter,
            execution_log,
            registry,
        })
    }

    pub fn task_id(&self) -> TaskId {
        self.task.read().id
    }

    pub fn task(&self) -> Task {
        self.task.read().clone()
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.read()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.state_changes.subscribe()
    }

    pub fn set_not_started_reason(&self, reason: Option<String>) {
        *self.not_started_reason.write() = reason;
    }

    pub fn view(&self) -> TaskView {
        let task = self.task.read();
        TaskView {
            id: task.id,
            enabled: task.enabled,
            watch_directory: task.watch.directory.clone(),
            watch_glob: task.watch.glob_pattern.clone(),
            concurrency: task.effective_concurrency(self.runtime_default_concurrency),
            state: self.state(),
            processed_count: self.processed_count.load(Ordering::Relaxed),
            failed_count: self.failed_count.load(Ordering::Relaxed),
            last_activity_at: *self.last_activity_at.read(),
            last_error: self.last_error.read().clone(),
            not_started_reason: self.not_started_reason.read().clone(),
        }
    }

    fn transition(&self, next: SupervisorState, reason: &str) -> Result<(), CronplusError> {
        let from = {
            let mut guard = self.state.write();
            let from = *guard;
            match from.transition(next) {
                Ok(to) => {
                    *guard = to;
                    from
                }
                Err((from, to)) => {
                    return Err(CronplusError::Config(format!("illegal supervisor transition {from} -> {to}")));
                }
            }
        };
        let _ = self.state_changes.send(StateChanged {
            task_id: self.task_id(),
            from,
            to: next,
            reason: reason.to_string(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Created/Stopped/Failed -> Initializing -> Idle (or Stopped if disabled).
    pub async fn initialize(&self) -> Result<(), CronplusError> {
        self.transition(SupervisorState::Initializing, "initialize")?;
        if !self.task.read().enabled {
            self.transition(SupervisorState::Stopped, "task disabled")?;
            return Ok(());
        }
        self.transition(SupervisorState::Idle, "initialized")?;
        Ok(())
    }

    /// Spawns the Watcher and the worker pool. No-op if already running.
    pub async fn start(self: &Arc<Self>) -> Result<(), CronplusError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(());
        }
        if !matches!(self.state(), SupervisorState::Idle | SupervisorState::Degraded) {
            return Err(CronplusError::Config(format!("cannot start supervisor in state {}", self.state())));
        }

        let handles = self.spawn_running_handles()?;
        *running = Some(handles);
        info!(task_id = %self.task_id(), "supervisor started");
        Ok(())
    }

    fn spawn_running_handles(self: &Arc<Self>) -> Result<RunningHandles, CronplusError> {
        let task = self.task.read().clone();
        let capacity = task.channel_capacity(self.runtime_default_concurrency);
        let concurrency = task.effective_concurrency(self.runtime_default_concurrency);

        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (error_tx, error_rx) = mpsc::channel::<CronplusError>(WATCHER_ERROR_CHANNEL_CAPACITY);
        let watcher = spawn_watcher(&task, event_tx.clone(), error_tx.clone())?;

        let workers_cancel = CancellationToken::new();
        let shared_rx = Arc::new(tokio::sync::Mutex::new(event_rx));
        let mut workers = Vec::with_capacity(concurrency);
        for _ in 0..concurrency {
            workers.push(tokio::spawn(worker_loop(Arc::clone(self), Arc::clone(&shared_rx), workers_cancel.clone())));
        }

        let watcher_supervisor = tokio::spawn(watcher_health_loop(Arc::clone(self), error_rx, workers_cancel.clone()));

        Ok(RunningHandles { event_tx, error_tx, watcher, workers_cancel, workers, watcher_supervisor })
    }

    /// Idle/Processing -> Paused: stops the Watcher, keeps the worker pool
    /// (in-flight executions finish, no new work is drawn).
    pub async fn pause(&self) -> Result<(), CronplusError> {
        self.transition(SupervisorState::Paused, "pause")?;
        let mut running = self.running.lock().await;
        if let Some(handles) = running.as_mut() {
            handles.watcher.cancel();
        }
        Ok(())
    }

    /// Paused -> Idle: re-arms the Watcher with the same config, reusing the
    /// existing worker pool and channel.
    pub async fn resume(&self) -> Result<(), CronplusError> {
        let mut running = self.running.lock().await;
        let Some(handles) = running.as_mut() else {
            return Err(CronplusError::Config("supervisor is not running".to_string()));
        };
        let task = self.task.read().clone();
        let watcher = spawn_watcher(&task, handles.event_tx.clone(), handles.error_tx.clone())?;
        handles.watcher = watcher;
        drop(running);
        self.transition(SupervisorState::Idle, "resume")?;
        Ok(())
    }

    /// Cancels the Supervisor's context; in-flight work finishes if it
    /// completes within `timeout`, otherwise is abandoned.
    pub async fn stop(&self, timeout: Duration) -> Result<(), CronplusError> {
        if self.state() == SupervisorState::Stopped {
            return Ok(());
        }
        self.transition(SupervisorState::Stopping, "stop requested")?;

        let handles = self.running.lock().await.take();
        if let Some(handles) = handles {
            handles.watcher.cancel();
            handles.workers_cancel.cancel();
            handles.watcher_supervisor.abort();

            let join_all = async {
                for worker in handles.workers {
                    let _ = worker.await;
                }
                handles.watcher.join().await;
            };
            if tokio::time::timeout(timeout, join_all).await.is_err() {
                warn!(task_id = %self.task_id(), timeout_ms = timeout.as_millis() as u64, "stop timed out, abandoning in-flight work");
            }
        }

        self.transition(SupervisorState::Stopped, "stopped")?;
        Ok(())
    }

    /// Stops (if running) and replaces the task definition, then restarts.
    /// Callers hold no lock across the await boundary, but the `running`
    /// mutex means `view()`/`snapshot()` never observes a mixed pre/post
    /// state: it's either the old handles or the new ones.
    pub async fn reload(self: &Arc<Self>, new_task: Task) -> Result<(), CronplusError> {
        self.stop(Duration::from_millis(5_000)).await?;
        *self.task.write() = new_task;
        self.transition(SupervisorState::Initializing, "reload")?;
        self.transition(SupervisorState::Idle, "reloaded")?;
        self.start().await
    }

    fn record_started_processing(&self) {
        if self.active_workers.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = self.transition(SupervisorState::Processing, "processing started");
        }
    }

    fn record_finished_processing(&self, outcome: Option<ExecutionOutcome>) {
        *self.last_activity_at.write() = Some(chrono::Utc::now());
        match outcome {
            Some(ExecutionOutcome::Done) | Some(ExecutionOutcome::Skipped) => {
                self.processed_count.fetch_add(1, Ordering::Relaxed);
            }
            Some(ExecutionOutcome::Failed) => {
                self.failed_count.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
        if self.active_workers.fetch_sub(1, Ordering::SeqCst) == 1 && self.state() == SupervisorState::Processing {
            let _ = self.transition(SupervisorState::Idle, "processing finished");
        }
    }

    fn record_error(&self, message: String) {
        *self.last_error.write() = Some(message);
    }

    /// One watcher restart attempt reusing the current `event_tx`/`error_tx`,
    /// returning whether it succeeded.
    async fn try_restart_watcher(&self) -> bool {
        let task = self.task.read().clone();
        let mut running = self.running.lock().await;
        let Some(handles) = running.as_mut() else { return false };
        match spawn_watcher(&task, handles.event_tx.clone(), handles.error_tx.clone()) {
            Ok(watcher) => {
                let old = std::mem::replace(&mut handles.watcher, watcher);
                old.cancel();
                true
            }
            Err(err) => {
                self.record_error(err.to_string());
                false
            }
        }
    }
}

fn spawn_watcher(task: &Task, events: EventSender, errors: mpsc::Sender<CronplusError>) -> Result<WatcherHandle, CronplusError> {
    let (raw_errors_tx, mut raw_errors_rx) = mpsc::channel(WATCHER_ERROR_CHANNEL_CAPACITY);
    let handle = cronplus_watch::spawn(task.id, task.watch.clone(), SystemClock, events, raw_errors_tx)
        .map_err(|source| CronplusError::Watcher { task_id: task.id.to_string(), message: source.to_string(), watcher_stopped: true })?;

    // Bridge `cronplus_watch::WatcherError` onto the Supervisor's own error
    // channel so callers only need to know about `CronplusError`.
    tokio::spawn(async move {
        while let Some(err) = raw_errors_rx.recv().await {
            let mapped = CronplusError::Watcher { task_id: err.task_id.to_string(), message: err.message, watcher_stopped: err.watcher_stopped };
            if errors.send(mapped).await.is_err() {
                return;
            }
        }
    });
    Ok(handle)
}

async fn worker_loop(supervisor: Arc<Supervisor>, shared_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<cronplus_core::FileEvent>>>, cancel: CancellationToken) {
    loop {
        let event = {
            let mut rx = shared_rx.lock().await;
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                received = rx.recv() => received,
            }
        };
        let Some(event) = event else { return };

        let task = supervisor.task.read().clone();
        let correlation_id = format!("exe-{}", nanoid::nanoid!(19));
        supervisor.record_started_processing();
        let outcome = executor::execute(
            &supervisor.state_store,
            &supervisor.dead_letter,
            &supervisor.execution_log,
            &supervisor.registry,
            &task,
            event.path,
            correlation_id,
            &cancel,
        )
        .await;

        match outcome {
            Ok(outcome) => supervisor.record_finished_processing(Some(outcome)),
            Err(err) => {
                supervisor.record_error(err.to_string());
                supervisor.record_finished_processing(None);
            }
        }
    }
}

/// Watches for Watcher errors and drives the Supervisor's health-check
/// behavior: a transient error triggers one restart attempt
/// after an exponential backoff capped at 60s; repeated failure escalates
/// Idle/Processing -> Degraded -> Failed.
async fn watcher_health_loop(supervisor: Arc<Supervisor>, mut errors: mpsc::Receiver<CronplusError>, cancel: CancellationToken) {
    let mut backoff = Duration::from_secs(1);
    loop {
        let error = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            received = errors.recv() => received,
        };
        let Some(error) = error else { return };
        warn!(task_id = %supervisor.task_id(), error = %error, "watcher error observed");
        supervisor.record_error(error.to_string());

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(backoff) => {}
        }
        if cancel.is_cancelled() {
            return;
        }

        if supervisor.try_restart_watcher().await {
            debug!(task_id = %supervisor.task_id(), "watcher restarted after transient error");
            backoff = Duration::from_secs(1);
            if supervisor.state() == SupervisorState::Degraded {
                let _ = supervisor.transition(SupervisorState::Idle, "watcher recovered");
            }
        } else {
            backoff = (backoff * 2).min(MAX_WATCHER_BACKOFF);
            let current = supervisor.state();
            if matches!(current, SupervisorState::Idle | SupervisorState::Processing) {
                let _ = supervisor.transition(SupervisorState::Degraded, "watcher restart failed");
            } else if current == SupervisorState::Degraded {
                let _ = supervisor.transition(SupervisorState::Failed, "watcher restart repeatedly failed");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
