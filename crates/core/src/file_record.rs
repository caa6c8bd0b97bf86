// SPDX-License-Identifier: MIT

//! Durable per-(task, file, fingerprint) state records.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Status a [`FileRecord`] can be in. Transitions: Queued -> Processing ->
/// {Done, Failed}; Failed may re-enter Processing on explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

crate::simple_display! {
    FileStatus {
        Queued => "queued",
        Processing => "processing",
        Done => "done",
        Failed => "failed",
    }
}

impl FileStatus {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: FileStatus) -> bool {
        use FileStatus::*;
        matches!(
            (self, next),
            (Queued, Processing)
                | (Processing, Done)
                | (Processing, Failed)
                | (Failed, Processing)
                // Dead-letter requeue sends a Failed record
                // back to Queued for re-observation.
                | (Failed, Queued)
                // Idempotent re-marks (e.g. a crash replay re-applying the same
                // terminal state) are allowed; anything else is rejected.
                | (Done, Done)
                | (Failed, Failed)
                | (Processing, Processing)
        )
    }
}

/// SHA-256 content fingerprint of a file.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Cheaper, weaker fingerprint for implementers who document the tradeoff
///: size+mtime rather than full content hash.
pub fn size_mtime_fingerprint(size: u64, mtime_epoch_ms: u64) -> String {
    format!("sz{size}-mt{mtime_epoch_ms}")
}

/// Storage key: SHA-256(taskId || 0x00 || absolutePath || 0x00 || fingerprint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey(pub [u8; 32]);

impl StateKey {
    pub fn new(task_id: &TaskId, path: &Path, fingerprint: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(task_id.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(fingerprint.as_bytes());
        let digest = hasher.finalize();
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&digest);
        Self(buf)
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A durable record of one (task, path, fingerprint) execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub task_id: TaskId,
    pub path: std::path::PathBuf,
    pub fingerprint: String,
    pub status: FileStatus,
    pub attempts: u32,
    #[serde(default)]
    pub last_error: String,
    pub correlation_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FileRecord {
    pub fn key(&self) -> StateKey {
        StateKey::new(&self.task_id, &self.path, &self.fingerprint)
    }
}

#[cfg(test)]
#[path = "file_record_tests.rs"]
mod tests;
