// SPDX-License-Identifier: MIT

use super::*;
use crate::action::Action;
use cronplus_core::TaskId;
use cronplus_expr::{ExecutionContext, FileMeta};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

fn ctx_with_size(size: u64) -> ExecutionContext {
    let file = FileMeta { path: "/in/doc.pdf".into(), size, mtime_utc: chrono::Utc::now() };
    ExecutionContext::new(TaskId::new(), "corr-1".to_string(), file, HashMap::new(), chrono::Utc::now())
}

#[tokio::test]
async fn true_branch_selects_true_action() {
    let context = ctx_with_size(2048);
    let token = CancellationToken::new();
    let params = serde_json::json!({"expression": "file.size > 1024", "true_action": "skip", "false_action": "continue"});
    let result =
        DecisionAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("decides");
    assert_eq!(result.outputs["branch"], "skip");
}

#[tokio::test]
async fn false_branch_selects_false_action() {
    let context = ctx_with_size(10);
    let token = CancellationToken::new();
    let params = serde_json::json!({"expression": "file.size > 1024", "true_action": "skip", "false_action": "stop"});
    let result =
        DecisionAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("decides");
    assert_eq!(result.outputs["branch"], "stop");
}

#[tokio::test]
async fn malformed_expression_fails_the_step() {
    let context = ctx_with_size(10);
    let token = CancellationToken::new();
    let params = serde_json::json!({"expression": "file.size >", "true_action": "continue", "false_action": "continue"});
    let err = DecisionAction
        .run(ActionInput { ctx: &context, params: &params, cancellation: &token })
        .await
        .expect_err("malformed expression must fail");
    assert!(matches!(err, CronplusError::Expression(_)));
}
