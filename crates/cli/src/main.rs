// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplusd: the file-driven automation engine.
//!
//! A single process hosting the Supervisor Manager, with subcommands for
//! running it to completion and for inspecting its durable stores directly.
//! No HTTP/RPC control surface is specified; that transport is
//! an external collaborator's concern, not this binary's.

mod bootstrap;
mod commands;
mod exit_code;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Banner printed by `cronplusd --version`, embedding the build's git hash.
const VERSION_BANNER: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "cronplusd", version = VERSION_BANNER, about = "File-driven automation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the configuration and run until a shutdown signal arrives.
    Run {
        /// Path to a .toml or .hcl configuration document.
        #[arg(long, default_value = "cronplus.toml")]
        config: PathBuf,
    },
    /// Parse and structurally validate a configuration document, then exit.
    Validate {
        #[arg(long, default_value = "cronplus.toml")]
        config: PathBuf,
    },
    /// Inspect the State Store directly.
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
    /// Inspect and requeue entries in the Dead-Letter Queue.
    DeadLetter {
        #[command(subcommand)]
        command: DeadLetterCommand,
    },
}

#[derive(Subcommand)]
enum StateCommand {
    /// List FileRecords, optionally scoped to one task.
    List {
        #[arg(long)]
        state_store_location: PathBuf,
        #[arg(long)]
        task_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeadLetterCommand {
    /// List dead-letter entries, most-recent-first.
    List {
        #[arg(long)]
        dead_letter_location: PathBuf,
        #[arg(long)]
        task_id: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Return a dead-letter entry's FileRecord to Queued for re-processing.
    Requeue {
        #[arg(long)]
        dead_letter_location: PathBuf,
        #[arg(long)]
        state_store_location: PathBuf,
        #[arg(long)]
        id: u64,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run { config } => commands::run::run(&config).await,
        Command::Validate { config } => commands::validate::run(&config),
        Command::State { command: StateCommand::List { state_store_location, task_id } } => {
            commands::state::list(&state_store_location, task_id)
        }
        Command::DeadLetter { command: DeadLetterCommand::List { dead_letter_location, task_id, limit } } => {
            commands::dead_letter::list(&dead_letter_location, task_id, limit)
        }
        Command::DeadLetter { command: DeadLetterCommand::Requeue { dead_letter_location, state_store_location, id } } => {
            commands::dead_letter::requeue(&dead_letter_location, &state_store_location, id)
        }
    };

    std::process::exit(code);
}
