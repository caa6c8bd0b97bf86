// SPDX-License-Identifier: MIT

//! `cronplusd validate` — parses and structurally validates a configuration
//! document without starting anything.

use crate::exit_code;
use std::path::PathBuf;

pub fn run(config_path: &PathBuf) -> i32 {
    match cronplus_config::load_from_path(config_path) {
        Ok(config) => {
            println!("ok: {} task(s) configured", config.tasks.len());
            for task in &config.tasks {
                let status = if task.enabled { "enabled" } else { "disabled" };
                println!(
                    "  {} [{}] watch={} glob={:?} pipeline={} step(s)",
                    task.id,
                    status,
                    task.watch.directory.display(),
                    task.watch.glob_pattern,
                    task.pipeline.len(),
                );
            }
            exit_code::CLEAN_STOP
        }
        Err(err) => {
            eprintln!("configuration error: {err}");
            exit_code::BAD_CONFIG
        }
    }
}
