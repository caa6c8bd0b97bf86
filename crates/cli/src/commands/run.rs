// SPDX-License-Identifier: MIT

//! `cronplusd run` — the long-lived process: applies the configured tasks,
//! then idles until a shutdown signal, periodically reconciling the live
//! Supervisor set against the applied config.

use crate::bootstrap::open_stores;
use crate::exit_code;
use cronplus_actions::ActionRegistry;
use cronplus_engine::SupervisorManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

/// Interval between reconciliation passes.
const RECONCILE_INTERVAL: Duration = Duration::from_secs(180);

pub async fn run(config_path: &PathBuf) -> i32 {
    let config = match cronplus_config::load_from_path(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return exit_code::BAD_CONFIG;
        }
    };

    let stores = match open_stores(&config.runtime) {
        Ok(stores) => stores,
        Err(err) => {
            eprintln!("failed to open durable stores: {err}");
            return exit_code::for_engine_error(&err);
        }
    };

    let registry = Arc::new(ActionRegistry::with_builtins());
    let manager = Arc::new(SupervisorManager::from_config(
        &config,
        Arc::clone(&stores.state_store),
        Arc::clone(&stores.dead_letter),
        Arc::clone(&stores.execution_log),
        registry,
    ));

    info!(tasks = config.tasks.len(), "applying configuration");
    let diff = manager.apply_config(config.tasks.clone()).await;
    info!(added = diff.added.len(), changed = diff.changed.len(), removed = diff.removed.len(), "configuration applied");

    for view in manager.snapshot() {
        if let Some(reason) = &view.not_started_reason {
            warn!(task_id = %view.id, reason, "task not started");
        }
    }

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "failed to install SIGTERM handler");
            return exit_code::INTERNAL_ERROR;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "failed to install SIGINT handler");
            return exit_code::INTERNAL_ERROR;
        }
    };

    let mut reconcile_tick = tokio::time::interval(RECONCILE_INTERVAL);
    reconcile_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("cronplusd ready");
    let exit = loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, stopping");
                break exit_code::TERMINATED_BY_SIGNAL;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, stopping");
                break exit_code::TERMINATED_BY_SIGNAL;
            }
            _ = reconcile_tick.tick() => {
                manager.reconcile().await;
            }
        }
    };

    manager.stop_all().await;
    if let Err(err) = stores.state_store.close() {
        error!(%err, "error closing state store");
    }
    if let Err(err) = stores.dead_letter.close() {
        error!(%err, "error closing dead-letter queue");
    }

    info!("cronplusd stopped");
    exit
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
