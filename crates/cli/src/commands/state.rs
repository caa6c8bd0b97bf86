// SPDX-License-Identifier: MIT

//! `cronplusd state` — read-only introspection of the State Store, opened
//! directly from its on-disk location rather than through a running daemon.

use crate::exit_code;
use cronplus_core::TaskId;
use std::path::PathBuf;

pub fn list(state_store_location: &PathBuf, task_id: Option<String>) -> i32 {
    let wal = state_store_location.join("state.wal");
    let snapshot = state_store_location.join("state.snapshot");
    let store = match cronplus_storage::StateStore::open(wal, snapshot) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("state store unavailable: {err}");
            return exit_code::STATE_STORE_UNAVAILABLE;
        }
    };

    let filter = task_id.map(TaskId::from_string);
    let records = store.iterate(filter.as_ref());
    match serde_json::to_string_pretty(&records) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize records: {err}");
            return exit_code::INTERNAL_ERROR;
        }
    }
    exit_code::CLEAN_STOP
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
