// SPDX-License-Identifier: MIT

//! Dead-Letter Queue: durable, append-only record of
//! failed executions, with bounded listing and requeue.

use crate::wal::Wal;
use cronplus_core::{CronplusError, FileStatus, TaskId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One failed-execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub id: u64,
    pub task_id: TaskId,
    pub path: PathBuf,
    pub fingerprint: String,
    pub last_step_index: usize,
    pub last_error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub struct DeadLetterQueue {
    wal: Mutex<Wal<DeadLetterEntry>>,
    entries: RwLock<Vec<DeadLetterEntry>>,
}

impl DeadLetterQueue {
    pub fn open(wal_path: impl Into<PathBuf>) -> Result<Self, CronplusError> {
        let mut wal: Wal<DeadLetterEntry> = Wal::open(wal_path, 0).map_err(CronplusError::from)?;
        let mut entries = Vec::new();
        while let Some(entry) = wal.next_unprocessed().map_err(CronplusError::from)? {
            entries.push(entry.event);
            wal.mark_processed(entry.seq);
        }
        Ok(Self { wal: Mutex::new(wal), entries: RwLock::new(entries) })
    }

    /// Must persist before returning.
    pub fn enqueue(
        &self,
        task_id: &TaskId,
        path: &Path,
        fingerprint: &str,
        last_step_index: usize,
        last_error: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<DeadLetterEntry, CronplusError> {
        let mut guard = self.wal.lock();
        let id = guard.write_seq() + 1;
        let entry = DeadLetterEntry {
            id,
            task_id: task_id.clone(),
            path: path.to_path_buf(),
            fingerprint: fingerprint.to_string(),
            last_step_index,
            last_error: last_error.to_string(),
            timestamp,
        };
        guard.append(&entry).map_err(CronplusError::from)?;
        guard.flush().map_err(CronplusError::from)?;
        drop(guard);

        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    /// Most-recent-first, optionally scoped to a task and/or age.
    pub fn list(
        &self,
        task_id: Option<&TaskId>,
        limit: usize,
        older_than: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Vec<DeadLetterEntry> {
        let guard = self.entries.read();
        guard
            .iter()
            .rev()
            .filter(|e| task_id.map_or(true, |t| &e.task_id == t))
            .filter(|e| older_than.map_or(true, |cutoff| e.timestamp < cutoff))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get(&self, entry_id: u64) -> Option<DeadLetterEntry> {
        self.entries.read().iter().find(|e| e.id == entry_id).cloned()
    }

    pub fn close(&self) -> Result<(), CronplusError> {
        self.wal.lock().flush().map_err(CronplusError::from)
    }
}

/// `(taskId, path, fingerprint)` addressed by the looked-up entry, so the
/// caller can drive `StateStore::mark(..., Queued, ...)` without this crate
/// depending on the store directly.
pub fn requeue_target(entry: &DeadLetterEntry) -> (TaskId, PathBuf, String) {
    (entry.task_id.clone(), entry.path.clone(), entry.fingerprint.clone())
}

/// The status a requeued [`FileRecord`](cronplus_core::FileRecord) should be
/// marked with.
pub const REQUEUE_STATUS: FileStatus = FileStatus::Queued;

#[cfg(test)]
#[path = "dead_letter_tests.rs"]
mod tests;
