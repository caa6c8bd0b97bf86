// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-engine: pipeline execution, task supervision, and the
//! in-process control surface tying the rest of cronplus together.

pub mod control;
pub mod executor;
pub mod manager;
pub mod supervisor;

pub use control::{ControlFacade, ControlResult, MetricsSnapshot};
pub use executor::{execute, ExecutionOutcome};
pub use manager::{ConfigDiff, SupervisorManager};
pub use supervisor::{Supervisor, TaskView};
