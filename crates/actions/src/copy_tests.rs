// SPDX-License-Identifier: MIT

use super::*;
use crate::action::Action;
use cronplus_core::TaskId;
use cronplus_expr::{ExecutionContext, FileMeta};
use std::collections::HashMap;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn ctx_for(path: PathBuf) -> ExecutionContext {
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let file = FileMeta { path, size, mtime_utc: chrono::Utc::now() };
    ExecutionContext::new(TaskId::new(), "corr-1".to_string(), file, HashMap::new(), chrono::Utc::now())
}

#[tokio::test]
async fn copies_file_atomically() {
    let src_dir = tempdir().expect("src tempdir");
    let dst_dir = tempdir().expect("dst tempdir");
    let src_path = src_dir.path().join("report.txt");
    tokio::fs::write(&src_path, b"hello world").await.expect("write source");

    let ctx = ctx_for(src_path);
    let params = serde_json::json!({
        "destination_directory": dst_dir.path(),
        "atomic": true,
        "verify_checksum": true,
    });
    let token = CancellationToken::new();
    let result = CopyAction
        .run(ActionInput { ctx: &ctx, params: &params, cancellation: &token })
        .await
        .expect("copy succeeds");

    assert_eq!(result.outcome, crate::action::Outcome::Success);
    let dest = dst_dir.path().join("report.txt");
    assert_eq!(tokio::fs::read(&dest).await.expect("read destination"), b"hello world");
    assert!(!dst_dir.path().join(".cronplus-tmp-report.txt").exists());
}

#[tokio::test]
async fn creates_destination_directory_when_missing() {
    let src_dir = tempdir().expect("src tempdir");
    let dst_root = tempdir().expect("dst tempdir");
    let dst_dir = dst_root.path().join("nested").join("deeper");
    let src_path = src_dir.path().join("x.bin");
    tokio::fs::write(&src_path, b"data").await.expect("write source");

    let ctx = ctx_for(src_path);
    let params = serde_json::json!({"destination_directory": dst_dir, "atomic": false, "verify_checksum": false});
    let token = CancellationToken::new();
    CopyAction.run(ActionInput { ctx: &ctx, params: &params, cancellation: &token }).await.expect("copy succeeds");

    assert!(dst_dir.join("x.bin").exists());
}

#[tokio::test]
async fn destination_filename_override_takes_precedence() {
    let src_dir = tempdir().expect("src tempdir");
    let dst_dir = tempdir().expect("dst tempdir");
    let src_path = src_dir.path().join("in.dat");
    tokio::fs::write(&src_path, b"payload").await.expect("write source");

    let ctx = ctx_for(src_path);
    let params = serde_json::json!({
        "destination_directory": dst_dir.path(),
        "destination_filename": "renamed.dat",
    });
    let token = CancellationToken::new();
    CopyAction.run(ActionInput { ctx: &ctx, params: &params, cancellation: &token }).await.expect("copy succeeds");

    assert!(dst_dir.path().join("renamed.dat").exists());
}

#[tokio::test]
async fn cancellation_before_copy_returns_cancelled_error() {
    let src_dir = tempdir().expect("src tempdir");
    let dst_dir = tempdir().expect("dst tempdir");
    let src_path = src_dir.path().join("x.txt");
    tokio::fs::write(&src_path, b"data").await.expect("write source");

    let ctx = ctx_for(src_path);
    let params = serde_json::json!({"destination_directory": dst_dir.path()});
    let token = CancellationToken::new();
    token.cancel();

    let err = CopyAction
        .run(ActionInput { ctx: &ctx, params: &params, cancellation: &token })
        .await
        .expect_err("cancelled before run must fail");
    assert!(matches!(err, CronplusError::Cancelled));
}
