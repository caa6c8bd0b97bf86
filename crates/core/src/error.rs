// SPDX-License-Identifier: MIT

//! Error taxonomy shared across the workspace.
//!
//! Every fallible boundary in cronplus returns a `Result` using these kinds
//! (or a crate-local enum that converts into one via `From`), never a panic
//! outside test code.

use thiserror::Error;

/// The full error taxonomy, independent of which component raised it.
#[derive(Debug, Error)]
pub enum CronplusError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("watcher error for task {task_id}: {message}")]
    Watcher { task_id: String, message: String, watcher_stopped: bool },

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("expression error: {0}")]
    Expression(String),

    #[error("interpolation error: unknown variable {0:?}")]
    Interpolation(String),

    #[error("cancelled")]
    Cancelled,

    #[error("state store unavailable: {0}")]
    Storage(String),

    #[error("plugin {plugin} misbehaved: {message}")]
    Plugin { plugin: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CronplusError {
    /// Whether an action step carrying this error should be retried per its
    /// retry policy.
    pub fn is_retryable(&self) -> bool {
        // Action I/O surfaces as the blanket `Io` variant via `?` inside
        // action implementations, so it carries the same retry eligibility
        // as an explicit `ActionFailed`.
        matches!(self, CronplusError::ActionFailed(_) | CronplusError::Timeout(_) | CronplusError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, CronplusError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
