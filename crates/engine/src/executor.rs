// SPDX-License-Identifier: MIT

//! Pipeline Executor: runs one pipeline for one
//! `(taskId, path)` triple. A single [`execute`] entry point, unit-tested
//! directly rather than only through the Supervisor, mirroring the
//! teacher's `executor_tests.rs` convention.

use cronplus_actions::{ActionInput, ActionRegistry, Outcome};
use cronplus_core::{
    content_fingerprint, CronplusError, DecisionBranch, ExecutionLogEntry, ExecutionStatus, FileStatus, StepDetail, Task,
};
use cronplus_expr::{ExecutionContext, FileMeta};
use cronplus_storage::{DeadLetterQueue, ExecutionLogStore, StateStore};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Terminal result of one [`execute`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The file was already `Done`; no work was performed.
    Skipped,
    Done,
    Failed,
}

/// Streaming SHA-256 of a file's content, read in fixed-size chunks so large files never
/// load fully into memory.
async fn compute_fingerprint(path: &std::path::Path) -> std::io::Result<String> {
    use sha2::{Digest, Sha256};

    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Run one task's pipeline against one stabilized file.
///
/// Holds the per-key advisory lock implicitly: the caller (the Supervisor's
/// worker pool) is responsible for drawing at most one in-flight execution
/// per `(taskId, path)` key at a time — a second worker that draws the same key observes `Processing`
/// via the State Store and yields.
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    state_store: &StateStore,
    dead_letter: &DeadLetterQueue,
    execution_log: &ExecutionLogStore,
    registry: &ActionRegistry,
    task: &Task,
    path: PathBuf,
    correlation_id: String,
    cancellation: &CancellationToken,
) -> Result<ExecutionOutcome, CronplusError> {
    let metadata = tokio::fs::metadata(&path).await?;
    let size = metadata.len();
    let mtime_utc = metadata
        .modified()
        .ok()
        .map(chrono::DateTime::<chrono::Utc>::from)
        .unwrap_or_else(chrono::Utc::now);
    let fingerprint = compute_fingerprint(&path).await?;

    let existing = state_store.get(&task.id, &path, &fingerprint);
    if let Some(record) = &existing {
        if record.status == FileStatus::Done {
            info!(task_id = %task.id, path = %path.display(), "skipping: already done");
            return Ok(ExecutionOutcome::Skipped);
        }
    }

    let attempts = existing.map(|r| r.attempts).unwrap_or(0) + 1;
    state_store.mark(&task.id, &path, &fingerprint, FileStatus::Processing, attempts, "")?;

    let started_at = chrono::Utc::now();
    let variables = task.variables.iter().map(|v| (v.name.clone(), v.effective_value().clone())).collect();
    let file = FileMeta { path: path.clone(), size, mtime_utc };
    let mut ctx = ExecutionContext::new(task.id.clone(), correlation_id.clone(), file, variables, started_at);

    let mut step_details = Vec::with_capacity(task.pipeline.len());
    let outcome = run_steps(registry, task, &mut ctx, cancellation, &mut step_details).await;

    match outcome {
        Ok(()) => {
            state_store.mark(&task.id, &path, &fingerprint, FileStatus::Done, attempts, "")?;
            execution_log.append(ExecutionLogEntry {
                id: 0,
                task_id: task.id.clone(),
                file_path: path.clone(),
                status: ExecutionStatus::Success,
                started_at,
                completed_at: Some(chrono::Utc::now()),
                error_message: None,
                step_details,
            })?;
            info!(task_id = %task.id, path = %path.display(), attempts, "pipeline done");
            Ok(ExecutionOutcome::Done)
        }
        Err((failed_step_index, error)) => {
            let message = error.to_string();
            state_store.mark(&task.id, &path, &fingerprint, FileStatus::Failed, attempts, &message)?;
            dead_letter.enqueue(&task.id, &path, &fingerprint, failed_step_index, &message, chrono::Utc::now())?;
            execution_log.append(ExecutionLogEntry {
                id: 0,
                task_id: task.id.clone(),
                file_path: path.clone(),
                status: ExecutionStatus::Failed,
                started_at,
                completed_at: Some(chrono::Utc::now()),
                error_message: Some(message.clone()),
                step_details,
            })?;
            warn!(task_id = %task.id, path = %path.display(), attempts, error = %message, "pipeline failed");
            Ok(ExecutionOutcome::Failed)
        }
    }
}

/// Runs the ordered step sequence, returning the index and error of the
/// first terminal failure.
async fn run_steps(
    registry: &ActionRegistry,
    task: &Task,
    ctx: &mut ExecutionContext,
    cancellation: &CancellationToken,
    step_details: &mut Vec<StepDetail>,
) -> Result<(), (usize, CronplusError)> {
    let steps = &task.pipeline;
    let mut i = 0usize;
    while i < steps.len() {
        if cancellation.is_cancelled() {
            step_details.push(StepDetail { name: steps[i].name.clone(), outcome: "failed".to_string(), attempts: 0, error: Some("cancelled".to_string()) });
            return Err((i, CronplusError::Cancelled));
        }

        let step = &steps[i];
        let kind = step
            .resolve()
            .map_err(|e| (i, CronplusError::Config(format!("step {:?}: {e}", step.name))))?;

        let params = cronplus_expr::interpolate_json(&step.params, ctx).map_err(|e| (i, CronplusError::Interpolation(e.to_string())))?;

        if kind.is_decision() {
            let action = registry
                .get(step.step_type.as_str())
                .ok_or_else(|| (i, CronplusError::Config("no decision action registered".to_string())))?;
            let input = ActionInput { ctx, params: &params, cancellation };
            let result = action.run(input).await.map_err(|e| (i, e))?;
            let branch = result.outputs.get("branch").and_then(|v| v.as_str()).unwrap_or("continue").to_string();
            ctx.merge_outputs(&step.name, result.outputs.clone());
            step_details.push(StepDetail { name: step.name.clone(), outcome: branch.clone(), attempts: 1, error: None });

            match branch.as_str() {
                "stop" => return Ok(()),
                "skip" => {
                    i += 2;
                    continue;
                }
                _ => {
                    i += 1;
                    continue;
                }
            }
        }

        let action = registry
            .get(step.step_type.as_str())
            .ok_or_else(|| (i, CronplusError::Plugin { plugin: step.step_type.clone(), message: "no action registered for step type".to_string() }))?;

        let retry = step.retry;
        let mut attempt = 0u32;
        loop {
            let input = ActionInput { ctx, params: &params, cancellation };
            match action.run(input).await {
                Ok(result) => {
                    step_details.push(StepDetail {
                        name: step.name.clone(),
                        outcome: match result.outcome {
                            Outcome::Success => "success".to_string(),
                            Outcome::Skipped => "skipped".to_string(),
                            Outcome::Failed => "failed".to_string(),
                        },
                        attempts: attempt + 1,
                        error: None,
                    });
                    ctx.merge_outputs(&step.name, result.outputs);
                    break;
                }
                Err(error) => {
                    let retryable = error.is_retryable() && attempt < retry.max_attempts;
                    if !retryable {
                        step_details.push(StepDetail { name: step.name.clone(), outcome: "failed".to_string(), attempts: attempt + 1, error: Some(error.to_string()) });
                        return Err((i, error));
                    }
                    let backoff = retry.backoff_for(attempt);
                    warn!(step = %step.name, attempt, backoff_ms = backoff.as_millis() as u64, error = %error, "step failed, retrying");
                    if !sleep_cancelable(backoff, cancellation).await {
                        step_details.push(StepDetail { name: step.name.clone(), outcome: "failed".to_string(), attempts: attempt + 1, error: Some("cancelled".to_string()) });
                        return Err((i, CronplusError::Cancelled));
                    }
                    attempt += 1;
                }
            }
        }

        i += 1;
    }
    Ok(())
}

/// Sleep for `duration`, respecting cancellation.
/// Returns `false` if cancelled before the sleep elapsed.
async fn sleep_cancelable(duration: Duration, cancellation: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancellation.is_cancelled();
    }
    tokio::select! {
        biased;
        () = cancellation.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// The branch a Decision step's outcome maps to, re-exported for callers
/// that need to reason about control flow outside this module.
pub fn decision_branch_name(branch: DecisionBranch) -> &'static str {
    match branch {
        DecisionBranch::Continue => "continue",
        DecisionBranch::Skip => "skip",
        DecisionBranch::Stop => "stop",
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
