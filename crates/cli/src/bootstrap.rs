// SPDX-License-Identifier: MIT

//! Turns a [`RuntimeConfig`]'s two configured locations into the concrete
//! WAL/snapshot file layout the storage crate expects.

use cronplus_config::RuntimeConfig;
use cronplus_core::CronplusError;
use cronplus_storage::{DeadLetterQueue, ExecutionLogStore, StateStore};
use std::path::PathBuf;
use std::sync::Arc;

pub struct OpenStores {
    pub state_store: Arc<StateStore>,
    pub dead_letter: Arc<DeadLetterQueue>,
    pub execution_log: Arc<ExecutionLogStore>,
}

/// Opens the three durable stores rooted at `runtime`'s configured
/// directories, creating those directories if missing.
pub fn open_stores(runtime: &RuntimeConfig) -> Result<OpenStores, CronplusError> {
    std::fs::create_dir_all(&runtime.state_store_location)?;
    std::fs::create_dir_all(&runtime.dead_letter_location)?;

    let state_wal: PathBuf = runtime.state_store_location.join("state.wal");
    let state_snapshot: PathBuf = runtime.state_store_location.join("state.snapshot");
    let dead_letter_wal: PathBuf = runtime.dead_letter_location.join("dead-letter.wal");
    let execution_log_wal: PathBuf = runtime.state_store_location.join("execution-log.wal");

    let state_store = Arc::new(StateStore::open(state_wal, state_snapshot)?);
    let dead_letter = Arc::new(DeadLetterQueue::open(dead_letter_wal)?);
    let execution_log = Arc::new(ExecutionLogStore::open(execution_log_wal)?);

    Ok(OpenStores { state_store, dead_letter, execution_log })
}
