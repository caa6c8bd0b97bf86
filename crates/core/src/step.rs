// SPDX-License-Identifier: MIT

//! Pipeline step model: a `type`-tagged variant dispatched through a
//! handler registry rather than a base-class hierarchy.
//!
//! [`Step`] is the as-parsed shape (a `type` discriminator plus an opaque
//! JSON payload) so config loading never needs to know about plugin step
//! types. [`StepKind::resolve`] turns a parsed step into one of the built-in
//! variants, or [`StepKind::Plugin`] for anything the registry owns instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Retry policy attached to any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_attempts: u32,
    #[serde(default)]
    pub backoff_milliseconds: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 0, backoff_milliseconds: 0 }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt_index` (0-based retry count); falls
    /// back to one second if a retry is configured with zero backoff.
    pub fn backoff_for(&self, attempt_index: u32) -> std::time::Duration {
        if self.max_attempts == 0 {
            return std::time::Duration::ZERO;
        }
        let ms = if self.backoff_milliseconds == 0 { 1000 } else { self.backoff_milliseconds };
        // Exponential growth is optional; we apply a simple doubling per retry.
        let factor = 1u64 << attempt_index.min(16);
        std::time::Duration::from_millis(ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    Rename,
    Overwrite,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    None,
    Basic,
    Bearer,
    ApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBranch {
    Continue,
    Skip,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyParams {
    pub destination_directory: PathBuf,
    #[serde(default)]
    pub atomic: bool,
    #[serde(default)]
    pub verify_checksum: bool,
    /// Destination filename template; defaults to the source basename if absent.
    #[serde(default)]
    pub destination_filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub secure_overwrite_passes: u32,
    #[serde(default = "DeleteParams::default_require_regular_file")]
    pub require_regular_file: bool,
    #[serde(default)]
    pub delete_empty_parents: bool,
    #[serde(default)]
    pub backup_path: Option<PathBuf>,
}

impl DeleteParams {
    fn default_require_regular_file() -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveParams {
    pub destination_directory: PathBuf,
    pub conflict_strategy: ConflictStrategy,
    #[serde(default)]
    pub preserve_subdirectories: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintParams {
    pub printer_name: String,
    #[serde(default)]
    pub printer_options: HashMap<String, String>,
    #[serde(default = "PrintParams::default_timeout_ms")]
    pub timeout_milliseconds: u64,
}

impl PrintParams {
    fn default_timeout_ms() -> u64 {
        30_000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestParams {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body_template: Option<String>,
    #[serde(default = "RestParams::default_auth")]
    pub auth: AuthKind,
    #[serde(default = "RestParams::default_timeout_ms")]
    pub timeout_milliseconds: u64,
}

impl RestParams {
    fn default_auth() -> AuthKind {
        AuthKind::None
    }

    fn default_timeout_ms() -> u64 {
        30_000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionParams {
    pub expression: String,
    pub true_action: DecisionBranch,
    pub false_action: DecisionBranch,
}

/// A step as parsed from configuration: a `type` discriminator plus an
/// opaque JSON payload, so loading a task never needs to know about
/// plugin-registered step types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(flatten)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// A resolved step payload: one of the built-in action types, or an opaque
/// plugin payload the registry owns.
#[derive(Debug, Clone)]
pub enum StepKind {
    Copy(CopyParams),
    Delete(DeleteParams),
    Archive(ArchiveParams),
    Print(PrintParams),
    Rest(RestParams),
    Decision(DecisionParams),
    Plugin { kind: String, payload: serde_json::Value },
}

impl StepKind {
    /// The discriminator string used for registry lookup and logging.
    pub fn type_name(&self) -> &str {
        match self {
            StepKind::Copy(_) => "copy",
            StepKind::Delete(_) => "delete",
            StepKind::Archive(_) => "archive",
            StepKind::Print(_) => "print",
            StepKind::Rest(_) => "rest",
            StepKind::Decision(_) => "decision",
            StepKind::Plugin { kind, .. } => kind,
        }
    }

    pub fn is_decision(&self) -> bool {
        matches!(self, StepKind::Decision(_))
    }

    /// Resolve a parsed [`Step`]'s payload into a known variant, or
    /// [`StepKind::Plugin`] if `step_type` isn't one of the built-ins — the
    /// registry then decides whether a plugin actually handles it.
    pub fn resolve(step_type: &str, params: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match step_type {
            "copy" => StepKind::Copy(serde_json::from_value(params.clone())?),
            "delete" => StepKind::Delete(serde_json::from_value(params.clone())?),
            "archive" => StepKind::Archive(serde_json::from_value(params.clone())?),
            "print" => StepKind::Print(serde_json::from_value(params.clone())?),
            "rest" => StepKind::Rest(serde_json::from_value(params.clone())?),
            "decision" => StepKind::Decision(serde_json::from_value(params.clone())?),
            other => StepKind::Plugin { kind: other.to_string(), payload: params.clone() },
        })
    }
}

impl Step {
    pub fn resolve(&self) -> Result<StepKind, serde_json::Error> {
        StepKind::resolve(&self.step_type, &self.params)
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
