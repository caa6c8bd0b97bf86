// SPDX-License-Identifier: MIT

//! Append-mostly execution log: not required for
//! correctness, backs `Control::listLogs`.

use crate::wal::Wal;
use cronplus_core::{CronplusError, ExecutionLogEntry, ExecutionStatus, TaskId};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;

/// Filter accepted by [`ExecutionLogStore::list`].
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub task_id: Option<TaskId>,
    pub status: Option<ExecutionStatus>,
}

pub struct ExecutionLogStore {
    wal: Mutex<Wal<ExecutionLogEntry>>,
    entries: RwLock<Vec<ExecutionLogEntry>>,
}

impl ExecutionLogStore {
    pub fn open(wal_path: impl Into<PathBuf>) -> Result<Self, CronplusError> {
        let mut wal: Wal<ExecutionLogEntry> = Wal::open(wal_path, 0).map_err(CronplusError::from)?;
        let mut entries = Vec::new();
        while let Some(entry) = wal.next_unprocessed().map_err(CronplusError::from)? {
            entries.push(entry.event);
            wal.mark_processed(entry.seq);
        }
        Ok(Self { wal: Mutex::new(wal), entries: RwLock::new(entries) })
    }

    /// Append one entry, assigning it the next id.
    pub fn append(&self, mut entry: ExecutionLogEntry) -> Result<ExecutionLogEntry, CronplusError> {
        let mut guard = self.wal.lock();
        entry.id = guard.write_seq() + 1;
        guard.append(&entry).map_err(CronplusError::from)?;
        guard.flush().map_err(CronplusError::from)?;
        drop(guard);

        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    /// Most-recent-first page of entries matching `filter`, `page_size` long
    /// starting at `offset`.
    pub fn list(&self, filter: &LogFilter, offset: usize, page_size: usize) -> Vec<ExecutionLogEntry> {
        let guard = self.entries.read();
        guard
            .iter()
            .rev()
            .filter(|e| filter.task_id.as_ref().map_or(true, |t| &e.task_id == t))
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect()
    }

    pub fn close(&self) -> Result<(), CronplusError> {
        self.wal.lock().flush().map_err(CronplusError::from)
    }
}

#[cfg(test)]
#[path = "execution_log_store_tests.rs"]
mod tests;
