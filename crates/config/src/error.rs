// SPDX-License-Identifier: MIT

//! Configuration-specific error kinds.
//!
//! Invalid or ambiguous configuration is surfaced to the caller of
//! `applyConfig`; it is never fatal to a running engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read { path: std::path::PathBuf, #[source] source: std::io::Error },

    #[error("unrecognized configuration format for {path:?}; expected .toml or .hcl")]
    UnknownFormat { path: std::path::PathBuf },

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse HCL configuration: {0}")]
    Hcl(#[from] hcl::Error),

    #[error("duplicate task id {0:?}")]
    DuplicateTaskId(String),

    #[error("task {task_id:?} has an empty pipeline")]
    EmptyPipeline { task_id: String },

    #[error("task {task_id:?} watch directory must be an absolute path, got {directory:?}")]
    RelativeWatchDirectory { task_id: String, directory: std::path::PathBuf },

    #[error("task {task_id:?} step {step_name:?}: {message}")]
    InvalidStep { task_id: String, step_name: String, message: String },
}

impl From<ConfigError> for cronplus_core::CronplusError {
    fn from(err: ConfigError) -> Self {
        cronplus_core::CronplusError::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
