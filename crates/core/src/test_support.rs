// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::file_record::{FileRecord, FileStatus};
use crate::step::{CopyParams, RetryPolicy, Step};
use crate::task::TaskId;
use std::path::PathBuf;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::file_record::FileStatus;
    use crate::supervisor_state::SupervisorState;
    use proptest::prelude::*;

    pub fn arb_file_status() -> impl Strategy<Value = FileStatus> {
        prop_oneof![
            Just(FileStatus::Queued),
            Just(FileStatus::Processing),
            Just(FileStatus::Done),
            Just(FileStatus::Failed),
        ]
    }

    pub fn arb_supervisor_state() -> impl Strategy<Value = SupervisorState> {
        prop_oneof![
            Just(SupervisorState::Created),
            Just(SupervisorState::Initializing),
            Just(SupervisorState::Idle),
            Just(SupervisorState::Processing),
            Just(SupervisorState::Paused),
            Just(SupervisorState::Stopping),
            Just(SupervisorState::Stopped),
            Just(SupervisorState::Failed),
            Just(SupervisorState::Degraded),
        ]
    }
}

// ── Factory functions ────────────────────────────────────────────────────

pub fn file_record(task_id: &str, path: &str, fingerprint: &str, status: FileStatus) -> FileRecord {
    let now = chrono::Utc::now();
    FileRecord {
        task_id: TaskId::from_string(task_id),
        path: PathBuf::from(path),
        fingerprint: fingerprint.to_string(),
        status,
        attempts: 0,
        last_error: String::new(),
        correlation_id: "test-correlation".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn copy_step(name: &str, destination_directory: &str) -> Step {
    let params = CopyParams {
        destination_directory: PathBuf::from(destination_directory),
        atomic: true,
        verify_checksum: false,
        destination_filename: None,
    };
    Step {
        name: name.to_string(),
        step_type: "copy".to_string(),
        params: serde_json::to_value(params).expect("serialize copy params"),
        retry: RetryPolicy::default(),
    }
}
