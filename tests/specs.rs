//! Behavioral specifications for cronplusd.
//!
//! Black-box: these invoke the `cronplusd` binary and verify on-disk
//! effects, stdout, and exit codes (spec.md S8).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/validate.rs"]
mod cli_validate;
#[path = "specs/cli/dead_letter.rs"]
mod cli_dead_letter;
#[path = "specs/cli/state.rs"]
mod cli_state;

#[path = "specs/daemon/copy_delete.rs"]
mod daemon_copy_delete;
#[path = "specs/daemon/archive_conflict.rs"]
mod daemon_archive_conflict;
#[path = "specs/daemon/decision_stop.rs"]
mod daemon_decision_stop;
#[path = "specs/daemon/stabilize_continuous_writes.rs"]
mod daemon_stabilize_continuous_writes;
#[path = "specs/daemon/crash_recovery.rs"]
mod daemon_crash_recovery;
