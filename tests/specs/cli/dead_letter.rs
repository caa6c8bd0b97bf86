use crate::prelude::*;

#[test]
fn empty_queue_lists_as_empty_json_array() {
    let ws = Workspace::new();
    let output = cronplusd(&["dead-letter", "list", "--dead-letter-location", ws.path("dead-letter").to_str().expect("utf8 path")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn requeue_of_unknown_entry_fails() {
    let ws = Workspace::new();
    let output = cronplusd(&[
        "dead-letter",
        "requeue",
        "--dead-letter-location",
        ws.path("dead-letter").to_str().expect("utf8 path"),
        "--state-store-location",
        ws.path("state").to_str().expect("utf8 path"),
        "--id",
        "999",
    ]);
    assert_eq!(output.status.code(), Some(70));
}
