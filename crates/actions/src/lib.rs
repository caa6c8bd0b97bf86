// SPDX-License-Identifier: MIT

//! The built-in Action Library: Copy, Delete, Archive,
//! Print, REST, and Decision, each dispatched through [`ActionRegistry`]
//! rather than matched on directly, so plugin-registered step types use the
//! same seam.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod action;
mod archive;
mod cancel;
mod copy;
mod decision;
mod delete;
mod print;
mod registry;
mod rest;

pub use action::{Action, ActionInput, ActionResult, Outcome};
pub use archive::ArchiveAction;
pub use copy::CopyAction;
pub use decision::DecisionAction;
pub use delete::DeleteAction;
pub use print::PrintAction;
pub use registry::ActionRegistry;
pub use rest::RestAction;
