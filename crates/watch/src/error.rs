// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherStartError {
    #[error("failed to initialize filesystem watcher for {directory}: {source}")]
    Init { directory: std::path::PathBuf, #[source] source: notify::Error },

    #[error("failed to watch directory {directory}: {source}")]
    Watch { directory: std::path::PathBuf, #[source] source: notify::Error },
}

impl From<WatcherStartError> for cronplus_core::CronplusError {
    fn from(err: WatcherStartError) -> Self {
        cronplus_core::CronplusError::Watcher {
            task_id: String::new(),
            message: err.to_string(),
            watcher_stopped: true,
        }
    }
}
