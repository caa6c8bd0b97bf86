// SPDX-License-Identifier: MIT

//! The [`Action`] trait all step implementations satisfy.
//!
//! Mirrors the adapter-trait shape used elsewhere in this codebase: an
//! `async_trait` interface over `Send + Sync + 'static` implementors, a
//! dedicated error enum per concern, cancellation threaded through
//! explicitly rather than relying on task abort.

use async_trait::async_trait;
use cronplus_core::CronplusError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How an action concluded. `Skipped` and `Success` both
/// allow the pipeline to proceed to the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Skipped,
    Failed,
}

/// Result of running one action once: outcome, outputs merged
/// into the execution context under the step's name, and elapsed time for
/// the execution log.
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub outcome: Outcome,
    pub outputs: serde_json::Value,
    pub duration_elapsed: Duration,
}

impl ActionResult {
    pub fn success(outputs: serde_json::Value, duration_elapsed: Duration) -> Self {
        Self { outcome: Outcome::Success, outputs, duration_elapsed }
    }

    pub fn skipped(outputs: serde_json::Value, duration_elapsed: Duration) -> Self {
        Self { outcome: Outcome::Skipped, outputs, duration_elapsed }
    }
}

/// One action invocation's inputs: the execution context (for Decision's
/// member-access expressions), the already-interpolated parameter payload,
/// and a cancellation token actions must check so a stop/pause request can
/// cancel mid-step.
pub struct ActionInput<'a> {
    pub ctx: &'a cronplus_expr::ExecutionContext,
    pub params: &'a serde_json::Value,
    pub cancellation: &'a CancellationToken,
}

/// A runnable step implementation. Each concrete action type
/// (Copy, Delete, Archive, Print, REST, Decision) implements this over its
/// own parameter struct; the executor dispatches through
/// [`crate::registry::ActionRegistry`] instead of matching on `StepKind`
/// directly, so plugin-registered action types slot in the same way.
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Run the action once. Retries, if any, are the caller's responsibility
    /// — an action attempt is always a single try.
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError>;
}
