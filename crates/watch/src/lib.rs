// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-watch: per-task filesystem watching with debounce and
//! stabilization.

pub mod error;
pub mod filter;
pub mod stabilize;
pub mod watcher;

pub use error::WatcherStartError;
pub use watcher::{spawn, EventSender, WatcherHandle};
