// SPDX-License-Identifier: MIT

//! `cronplusd` subcommand implementations.

pub mod dead_letter;
pub mod run;
pub mod state;
pub mod validate;
