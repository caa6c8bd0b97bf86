// SPDX-License-Identifier: MIT

use super::*;
use crate::action::Action;
use cronplus_core::TaskId;
use cronplus_expr::{ExecutionContext, FileMeta};
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn ctx() -> ExecutionContext {
    let file = FileMeta { path: "/in/x.txt".into(), size: 1, mtime_utc: chrono::Utc::now() };
    ExecutionContext::new(TaskId::new(), "corr-1".to_string(), file, HashMap::new(), chrono::Utc::now())
}

/// Serve exactly one HTTP request with a fixed status/body, then stop.
async fn serve_once(status_line: &'static str, body: &'static str) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!("{status_line}\r\nContent-Length: {}\r\nContent-Type: application/json\r\n\r\n{body}", body.len());
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });
    addr
}

#[tokio::test]
async fn publishes_status_and_json_body_into_outputs() {
    let addr = serve_once("HTTP/1.1 200 OK", r#"{"ok":true}"#).await;
    let params = serde_json::json!({
        "method": "GET",
        "url": format!("http://{addr}/"),
        "timeout_milliseconds": 2000,
    });
    let context = ctx();
    let token = CancellationToken::new();
    let result =
        RestAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("request succeeds");

    assert_eq!(result.outputs["status"], 200);
    assert_eq!(result.outputs["body"]["ok"], true);
}

#[tokio::test]
async fn non_json_body_is_published_as_a_string() {
    let addr = serve_once("HTTP/1.1 200 OK", "plain text").await;
    let params = serde_json::json!({"method": "GET", "url": format!("http://{addr}/"), "timeout_milliseconds": 2000});
    let context = ctx();
    let token = CancellationToken::new();
    let result =
        RestAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("request succeeds");

    assert_eq!(result.outputs["body"], "plain text");
}

#[tokio::test]
async fn server_error_status_is_still_a_successful_action() {
    let addr = serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let params = serde_json::json!({"method": "GET", "url": format!("http://{addr}/"), "timeout_milliseconds": 2000});
    let context = ctx();
    let token = CancellationToken::new();
    let result =
        RestAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("request completes");

    assert_eq!(result.outputs["status"], 500);
}

#[tokio::test]
async fn unreachable_host_is_action_failed() {
    let params = serde_json::json!({"method": "GET", "url": "http://127.0.0.1:1", "timeout_milliseconds": 500});
    let context = ctx();
    let token = CancellationToken::new();
    let err = RestAction
        .run(ActionInput { ctx: &context, params: &params, cancellation: &token })
        .await
        .expect_err("connection refused must fail");
    assert!(matches!(err, CronplusError::ActionFailed(_)));
}

#[tokio::test]
async fn bearer_auth_header_is_sent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.expect("read request");
        let request_text = String::from_utf8_lossy(&buf[..n]).into_owned();
        let body = r#"{"ok":true}"#;
        let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}", body.len());
        let _ = socket.write_all(response.as_bytes()).await;
        request_text
    });

    let params = serde_json::json!({
        "method": "GET",
        "url": format!("http://{addr}/"),
        "auth": "bearer",
        "headers": {"token": "s3cr3t"},
        "timeout_milliseconds": 2000,
    });
    let context = ctx();
    let token = CancellationToken::new();
    RestAction.run(ActionInput { ctx: &context, params: &params, cancellation: &token }).await.expect("request succeeds");

    let request_text = handle.await.expect("server task");
    assert!(request_text.contains("authorization: bearer s3cr3t") || request_text.contains("Authorization: Bearer s3cr3t"));
    assert!(
        !request_text.to_lowercase().contains("token: s3cr3t") && !request_text.contains("token:s3cr3t"),
        "the raw `token` header field must not be forwarded verbatim alongside the Authorization header:\n{request_text}"
    );
}
