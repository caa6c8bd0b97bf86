use crate::prelude::*;

#[test]
fn empty_store_lists_as_empty_json_array() {
    let ws = Workspace::new();
    let output = cronplusd(&["state", "list", "--state-store-location", ws.path("state").to_str().expect("utf8 path")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn missing_directory_is_state_store_unavailable() {
    let ws = Workspace::new();
    let missing = ws.path("nested/missing");
    let output = cronplusd(&["state", "list", "--state-store-location", missing.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(75));
}
