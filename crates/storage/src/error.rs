// SPDX-License-Identifier: MIT

//! Storage-internal error kinds, folded into [`cronplus_core::CronplusError`]
//! at the public API boundary.

use cronplus_core::CronplusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot version {0} is newer than supported version {1}")]
    SnapshotTooNew(u32, u32),

    #[error("no migration path from version {0} to {1}")]
    NoMigrationPath(u32, u32),

    #[error("illegal status transition for {0}: {1:?} -> {2:?}")]
    IllegalTransition(String, cronplus_core::FileStatus, cronplus_core::FileStatus),

    #[error("dead-letter entry {0} not found")]
    DeadLetterEntryNotFound(u64),
}

impl From<StorageError> for CronplusError {
    fn from(err: StorageError) -> Self {
        CronplusError::Storage(err.to_string())
    }
}
