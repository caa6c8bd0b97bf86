// SPDX-License-Identifier: MIT

//! Per-task filesystem Watcher.
//!
//! One [`Watcher`] owns one `notify` subscription for one Task's watch
//! directory. Debounce collapses a burst of raw filesystem events per path
//! into a single pending notification; stabilization then polls size+mtime
//! until the file stops changing (or disappears) before emitting a
//! [`FileEvent`]. Debounce and stabilization deadlines share one
//! `tokio::select!` loop, following the debounce-map pattern used elsewhere
//! in this codebase for hot-reload watching.

use crate::error::WatcherStartError;
use crate::filter::{self, Candidate};
use crate::stabilize::{self, PollOutcome, Sample, Stabilizer};
use cronplus_core::{ChangeKind, Clock, FileEvent, TaskId, WatchSpec, WatcherError};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bounded output a Watcher publishes into; never dropped, only blocked on.
pub type EventSender = mpsc::Sender<FileEvent>;

/// Handle to a running Watcher task.
pub struct WatcherHandle {
    cancel: CancellationToken,
    join: tokio::task::JoinHandle<()>,
}

impl WatcherHandle {
    /// Request the watcher stop; does not wait for the task to exit.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Spawn a Watcher for one task. Returns immediately once the underlying
/// `notify` subscription is established; the event loop runs on its own
/// tokio task.
pub fn spawn<C: Clock>(
    task_id: TaskId,
    spec: WatchSpec,
    clock: C,
    events: EventSender,
    errors: mpsc::Sender<WatcherError>,
) -> Result<WatcherHandle, WatcherStartError> {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let directory = spec.directory.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.send(res);
        },
        notify::Config::default(),
    )
    .map_err(|source| WatcherStartError::Init { directory: directory.clone(), source })?;

    let recursive_mode = if spec.include_subdirectories { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
    watcher
        .watch(&directory, recursive_mode)
        .map_err(|source| WatcherStartError::Watch { directory: directory.clone(), source })?;

    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let join = tokio::spawn(run_loop(task_id, spec, Arc::new(clock), raw_rx, events, errors, loop_cancel, watcher));

    Ok(WatcherHandle { cancel, join })
}

enum PathState {
    Debouncing { deadline: Instant },
    Stabilizing { stabilizer: Stabilizer, next_poll: Instant },
}

#[allow(clippy::too_many_arguments)]
async fn run_loop<C: Clock>(
    task_id: TaskId,
    spec: WatchSpec,
    clock: Arc<C>,
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    events: EventSender,
    errors: mpsc::Sender<WatcherError>,
    cancel: CancellationToken,
    // Kept alive for the duration of the loop; dropping it stops the subscription.
    _watcher: RecommendedWatcher,
) {
    let debounce = std::time::Duration::from_millis(spec.debounce_milliseconds);
    let poll_interval = stabilize::poll_interval(debounce);
    let mut pending: HashMap<PathBuf, PathState> = HashMap::new();

    loop {
        let next_deadline = pending
            .values()
            .map(|state| match state {
                PathState::Debouncing { deadline } => *deadline,
                PathState::Stabilizing { next_poll, .. } => *next_poll,
            })
            .min();

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(task_id = %task_id, "watcher cancelled");
                return;
            }

            () = async {
                match next_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                fire_ready(&task_id, &spec, &clock, &mut pending, poll_interval, &events, &errors).await;
            }

            event = raw_rx.recv() => {
                match event {
                    Some(Ok(event)) => handle_raw_event(&spec, &mut pending, debounce, &event),
                    Some(Err(source)) => {
                        warn!(task_id = %task_id, error = %source, "watcher subscription error");
                        let _ = errors.send(WatcherError {
                            task_id: task_id.clone(),
                            message: source.to_string(),
                            watcher_stopped: true,
                        }).await;
                        return;
                    }
                    None => {
                        debug!(task_id = %task_id, "watcher channel closed");
                        return;
                    }
                }
            }
        }
    }
}

fn handle_raw_event(spec: &WatchSpec, pending: &mut HashMap<PathBuf, PathState>, debounce: std::time::Duration, event: &Event) {
    let Some(change_kind) = map_change_kind(&event.kind) else { return };

    for path in &event.paths {
        let Ok(relative) = path.strip_prefix(&spec.directory) else { continue };
        let candidate = Candidate { relative_path: relative, change_kind, size_bytes: file_size(path) };
        if !filter::matches(spec, &candidate) {
            continue;
        }
        pending.insert(path.clone(), PathState::Debouncing { deadline: Instant::now() + debounce });
    }
}

async fn fire_ready<C: Clock>(
    task_id: &TaskId,
    spec: &WatchSpec,
    clock: &Arc<C>,
    pending: &mut HashMap<PathBuf, PathState>,
    poll_interval: std::time::Duration,
    events: &EventSender,
    errors: &mpsc::Sender<WatcherError>,
) {
    let now = Instant::now();
    let ready: Vec<PathBuf> = pending
        .iter()
        .filter(|(_, state)| match state {
            PathState::Debouncing { deadline } => *deadline <= now,
            PathState::Stabilizing { next_poll, .. } => *next_poll <= now,
        })
        .map(|(path, _)| path.clone())
        .collect();

    for path in ready {
        match pending.remove(&path) {
            Some(PathState::Debouncing { .. }) => {
                pending.insert(
                    path.clone(),
                    PathState::Stabilizing {
                        stabilizer: Stabilizer::new(spec.stabilization_milliseconds),
                        next_poll: Instant::now(),
                    },
                );
            }
            Some(PathState::Stabilizing { mut stabilizer, .. }) => {
                let sample = read_sample(&path);
                match stabilizer.observe(sample, clock.epoch_ms()) {
                    PollOutcome::Pending => {
                        pending.insert(
                            path.clone(),
                            PathState::Stabilizing { stabilizer, next_poll: Instant::now() + poll_interval },
                        );
                    }
                    PollOutcome::Vanished => {
                        debug!(path = %path.display(), "file vanished during stabilization");
                    }
                    PollOutcome::Stable(_) => {
                        if !emit(task_id, spec, &path, events, errors).await {
                            return;
                        }
                    }
                }
            }
            None => {}
        }
    }
}

async fn emit(task_id: &TaskId, spec: &WatchSpec, path: &std::path::Path, events: &EventSender, errors: &mpsc::Sender<WatcherError>) -> bool {
    let Ok(relative) = path.strip_prefix(&spec.directory) else { return true };
    let change_kind = if path.exists() { ChangeKind::Changed } else { ChangeKind::Deleted };
    let candidate = Candidate { relative_path: relative, change_kind, size_bytes: file_size(path) };
    if !filter::matches(spec, &candidate) {
        return true;
    }

    let event = FileEvent { task_id: task_id.clone(), path: path.to_path_buf(), change_kind, detected_at: chrono::Utc::now() };
    info!(task_id = %task_id, path = %path.display(), "file stabilized");
    if events.send(event).await.is_err() {
        let _ = errors
            .send(WatcherError { task_id: task_id.clone(), message: "event receiver dropped".to_string(), watcher_stopped: true })
            .await;
        return false;
    }
    true
}

fn map_change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

fn file_size(path: &std::path::Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|meta| meta.len())
}

fn read_sample(path: &std::path::Path) -> Option<Sample> {
    let metadata = std::fs::metadata(path).ok()?;
    let mtime_epoch_ms = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0);
    Some(Sample { size: metadata.len(), mtime_epoch_ms })
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
