// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! cronplus-storage: durable WAL-backed state store, dead-letter queue, and
//! execution log.

mod dead_letter;
mod error;
mod execution_log_store;
mod migration;
mod snapshot;
mod state_store;
mod wal;

pub use dead_letter::{requeue_target, DeadLetterEntry, DeadLetterQueue, REQUEUE_STATUS};
pub use error::StorageError;
pub use execution_log_store::{ExecutionLogStore, LogFilter};
pub use migration::{Migration, MigrationRegistry};
pub use snapshot::{load_snapshot, store_snapshot, Snapshot};
pub use state_store::StateStore;
pub use wal::{Wal, WalEntry};
