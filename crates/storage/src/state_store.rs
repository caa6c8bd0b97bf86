// SPDX-License-Identifier: MIT

//! State Store: durable key/value store of [`FileRecord`],
//! keyed by `StateKey`. Backed by a [`Wal`] of upserts plus a periodic
//! zstd-compressed snapshot so restart replay stays bounded.

use crate::error::StorageError;
use crate::migration::MigrationRegistry;
use crate::snapshot::{load_snapshot, store_snapshot, Snapshot};
use crate::wal::Wal;
use cronplus_core::{Clock, CronplusError, FileRecord, FileStatus, StateKey, SystemClock, TaskId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

/// Materialized view persisted inside a snapshot. `StateKey` is a raw
/// 32-byte digest; JSON object keys must be strings, so it is hex-encoded.
type MaterializedRecords = HashMap<String, FileRecord>;

pub struct StateStore<C: Clock = SystemClock> {
    wal: Mutex<Wal<FileRecord>>,
    records: RwLock<MaterializedRecords>,
    snapshot_path: PathBuf,
    clock: C,
}

impl StateStore<SystemClock> {
    pub fn open(wal_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Result<Self, CronplusError> {
        Self::open_with_clock(wal_path, snapshot_path, SystemClock)
    }
}

impl<C: Clock> StateStore<C> {
    pub fn open_with_clock(
        wal_path: impl Into<PathBuf>,
        snapshot_path: impl Into<PathBuf>,
        clock: C,
    ) -> Result<Self, CronplusError> {
        let snapshot_path = snapshot_path.into();
        let registry = MigrationRegistry::new();
        let snapshot: Option<Snapshot<MaterializedRecords>> =
            load_snapshot(&snapshot_path, SNAPSHOT_VERSION, &registry).map_err(CronplusError::from)?;

        let (records, processed_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (HashMap::new(), 0),
        };

        let mut wal: Wal<FileRecord> = Wal::open(wal_path, processed_seq).map_err(CronplusError::from)?;
        let mut records = records;
        while let Some(entry) = wal.next_unprocessed().map_err(CronplusError::from)? {
            records.insert(entry.event.key().to_hex(), entry.event);
            wal.mark_processed(entry.seq);
        }

        Ok(Self { wal: Mutex::new(wal), records: RwLock::new(records), snapshot_path, clock })
    }

    pub fn get(&self, task_id: &TaskId, path: &Path, fingerprint: &str) -> Option<FileRecord> {
        let key = StateKey::new(task_id, path, fingerprint);
        self.records.read().get(&key.to_hex()).cloned()
    }

    /// Upsert with an updated timestamp, durable before returning.
    pub fn mark(
        &self,
        task_id: &TaskId,
        path: &Path,
        fingerprint: &str,
        status: FileStatus,
        attempts: u32,
        last_error: &str,
    ) -> Result<FileRecord, CronplusError> {
        let key = StateKey::new(task_id, path, fingerprint);
        let now = self.clock.utc_now();

        let mut guard = self.wal.lock();
        let existing = self.records.read().get(&key.to_hex()).cloned();
        if let Some(prior) = &existing {
            if !prior.status.can_transition_to(status) {
                return Err(StorageError::IllegalTransition(key.to_hex(), prior.status, status).into());
            }
        }

        let record = FileRecord {
            task_id: task_id.clone(),
            path: path.to_path_buf(),
            fingerprint: fingerprint.to_string(),
            status,
            attempts,
            last_error: last_error.to_string(),
            correlation_id: existing.as_ref().map(|r| r.correlation_id.clone()).unwrap_or_default(),
            created_at: existing.as_ref().map(|r| r.created_at).unwrap_or(now),
            updated_at: now,
        };

        guard.append(&record).map_err(CronplusError::from)?;
        guard.flush().map_err(CronplusError::from)?;

        // Update the in-memory view while still holding the WAL lock so a
        // concurrent `mark()` for the same key can never observe this
        // record's WAL entry without also observing it in `records`, or
        // validate its transition against state this write has superseded.
        self.records.write().insert(key.to_hex(), record.clone());
        drop(guard);

        Ok(record)
    }

    /// Snapshot of matching records at the time of the call; not restartable
    /// across store restarts.
    pub fn iterate(&self, task_id: Option<&TaskId>) -> Vec<FileRecord> {
        let guard = self.records.read();
        guard.values().filter(|r| task_id.map_or(true, |t| &r.task_id == t)).cloned().collect()
    }

    /// Write a fresh snapshot and drop WAL entries it subsumes, bounding
    /// replay time on the next restart.
    pub fn compact(&self) -> Result<(), CronplusError> {
        let records = self.records.read().clone();
        let mut guard = self.wal.lock();
        let seq = guard.write_seq();
        let snapshot = Snapshot { version: SNAPSHOT_VERSION, seq, state: records, created_at: self.clock.utc_now() };
        store_snapshot(&self.snapshot_path, &snapshot).map_err(CronplusError::from)?;
        guard.mark_processed(seq);
        guard.truncate_before(seq + 1).map_err(CronplusError::from)?;
        Ok(())
    }

    pub fn close(&self) -> Result<(), CronplusError> {
        self.wal.lock().flush().map_err(CronplusError::from)
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
