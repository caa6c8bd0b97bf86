// SPDX-License-Identifier: MIT

//! Print action: invokes an external printing subsystem by
//! name, aborting at a configured timeout.

use crate::action::{Action, ActionInput, ActionResult};
use async_trait::async_trait;
use cronplus_core::{CronplusError, PrintParams};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

pub struct PrintAction;

/// The printing subsystem binary to invoke. Overridable via
/// `CRONPLUS_PRINT_COMMAND` so tests can point at a stub instead of the
/// real `lp` from CUPS.
fn print_command() -> String {
    std::env::var("CRONPLUS_PRINT_COMMAND").unwrap_or_else(|_| "lp".to_string())
}

#[async_trait]
impl Action for PrintAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: PrintParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid print parameters: {e}")))?;
        let started = Instant::now();
        let timeout = Duration::from_millis(params.timeout_milliseconds);
        let path = input.ctx.file.path.clone();

        let mut command = Command::new(print_command());
        command.arg("-d").arg(&params.printer_name);
        for (key, value) in &params.printer_options {
            command.arg("-o").arg(format!("{key}={value}"));
        }
        command.arg(&path).stdout(Stdio::piped()).stderr(Stdio::piped());

        let run = async {
            let output = command.output().await?;
            if !output.status.success() {
                return Err(CronplusError::ActionFailed(format!(
                    "print to {:?} exited with {}: {}",
                    params.printer_name,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
            Ok(())
        };

        tokio::select! {
            biased;
            _ = input.cancellation.cancelled() => return Err(CronplusError::Cancelled),
            result = tokio::time::timeout(timeout, run) => {
                result.map_err(|_| CronplusError::Timeout(timeout))??;
            }
        }
        tracing::debug!(printer = %params.printer_name, path = %path.display(), "print action completed");

        Ok(ActionResult::success(
            serde_json::json!({"printer": params.printer_name}),
            started.elapsed(),
        ))
    }
}

#[cfg(test)]
#[path = "print_tests.rs"]
mod tests;
