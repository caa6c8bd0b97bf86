// SPDX-License-Identifier: MIT

//! `cronplusd dead-letter` — list and requeue entries in the Dead-Letter
//! Queue. Requeue composes the DLQ lookup with a State Store
//! write, exactly as `cronplus_storage::requeue_target` documents: this
//! crate is the one place both stores are open at once outside the engine.

use crate::exit_code;
use cronplus_core::{FileStatus, TaskId};
use cronplus_storage::{requeue_target, DeadLetterQueue, StateStore, REQUEUE_STATUS};
use std::path::PathBuf;

pub fn list(dead_letter_location: &PathBuf, task_id: Option<String>, limit: usize) -> i32 {
    let wal = dead_letter_location.join("dead-letter.wal");
    let queue = match DeadLetterQueue::open(wal) {
        Ok(queue) => queue,
        Err(err) => {
            eprintln!("dead-letter queue unavailable: {err}");
            return exit_code::STATE_STORE_UNAVAILABLE;
        }
    };

    let filter = task_id.map(TaskId::from_string);
    let entries = queue.list(filter.as_ref(), limit, None);
    match serde_json::to_string_pretty(&entries) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize entries: {err}");
            return exit_code::INTERNAL_ERROR;
        }
    }
    exit_code::CLEAN_STOP
}

pub fn requeue(dead_letter_location: &PathBuf, state_store_location: &PathBuf, entry_id: u64) -> i32 {
    let dlq_wal = dead_letter_location.join("dead-letter.wal");
    let queue = match DeadLetterQueue::open(dlq_wal) {
        Ok(queue) => queue,
        Err(err) => {
            eprintln!("dead-letter queue unavailable: {err}");
            return exit_code::STATE_STORE_UNAVAILABLE;
        }
    };

    let Some(entry) = queue.get(entry_id) else {
        eprintln!("dead-letter entry {entry_id} not found");
        return exit_code::INTERNAL_ERROR;
    };

    let state_wal = state_store_location.join("state.wal");
    let state_snapshot = state_store_location.join("state.snapshot");
    let store = match StateStore::open(state_wal, state_snapshot) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("state store unavailable: {err}");
            return exit_code::STATE_STORE_UNAVAILABLE;
        }
    };

    let (task_id, path, fingerprint) = requeue_target(&entry);
    let current = store.get(&task_id, &path, &fingerprint).map(|r| r.attempts).unwrap_or(0);
    match store.mark(&task_id, &path, &fingerprint, REQUEUE_STATUS, current, "") {
        Ok(_) => {
            debug_assert_eq!(REQUEUE_STATUS, FileStatus::Queued);
            println!("requeued entry {entry_id} for task {task_id} at {}", path.display());
            exit_code::CLEAN_STOP
        }
        Err(err) => {
            eprintln!("failed to requeue: {err}");
            exit_code::INTERNAL_ERROR
        }
    }
}

#[cfg(test)]
#[path = "dead_letter_tests.rs"]
mod tests;
