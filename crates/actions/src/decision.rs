// SPDX-License-Identifier: MIT

//! Decision action: evaluates an expression and
//! reports which control action the pipeline executor should apply. Unlike
//! every other action this never touches the filesystem or network and is
//! never retried — the executor inspects `outputs.branch` directly rather
//! than dispatching it through the same retry loop as side-effecting steps.

use crate::action::{Action, ActionInput, ActionResult};
use async_trait::async_trait;
use cronplus_core::{CronplusError, DecisionBranch, DecisionParams};
use std::time::Instant;

pub struct DecisionAction;

#[async_trait]
impl Action for DecisionAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: DecisionParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid decision parameters: {e}")))?;
        let started = Instant::now();

        let branch = if cronplus_expr::evaluate(&params.expression, input.ctx)? { params.true_action } else { params.false_action };

        Ok(ActionResult::success(serde_json::json!({"branch": branch_name(branch)}), started.elapsed()))
    }
}

fn branch_name(branch: DecisionBranch) -> &'static str {
    match branch {
        DecisionBranch::Continue => "continue",
        DecisionBranch::Skip => "skip",
        DecisionBranch::Stop => "stop",
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
