//! Scenario F (spec.md S8): crash recovery — a `Done` record survives a
//! kill-and-restart and is never reprocessed without an explicit requeue.

use crate::prelude::*;

#[test]
fn restart_after_crash_does_not_reprocess_a_done_file() {
    let ws = Workspace::new();

    let config = ws.write_config(&format!(
        r#"
[[tasks]]
id = "crash-recovery"

[tasks.watch]
directory = {in_dir:?}
glob_pattern = "*.bin"
debounce_milliseconds = 50
stabilization_milliseconds = 50

[[tasks.pipeline]]
name = "archive-it"
type = "archive"
destination_directory = {arc_dir:?}
conflict_strategy = "rename"
"#,
        in_dir = ws.path("in"),
        arc_dir = ws.path("arc"),
    ));

    let first_run = Daemon::spawn(&config);
    ws.write_file("in/a.bin", "payload");

    let archived_once = wait_for(WAIT_MAX_MS, || {
        std::fs::read_dir(ws.path("arc")).map(|entries| entries.filter_map(|e| e.ok()).count() >= 1).unwrap_or(false)
    });
    assert!(archived_once, "file should be archived on first run");

    let done_once = wait_for(WAIT_MAX_MS, || state_records(&ws).iter().any(|r| r["status"] == "done"));
    assert!(done_once, "state store should record Done before the crash");

    // Simulate a crash: kill without a graceful stop, then restart with the
    // same config and touch the now-archived-away source's replacement with
    // identical content so the watcher observes the same key again.
    first_run.kill();

    std::fs::create_dir_all(ws.path("in")).expect("recreate in dir");

    let second_run = Daemon::spawn(&config);
    ws.write_file("in/a.bin", "payload");

    // Give the (re-)watcher a chance to pick the file up and the executor a
    // chance to consult the State Store.
    std::thread::sleep(std::time::Duration::from_millis(500));
    second_run.stop();

    let records = state_records(&ws);
    let matching: Vec<_> = records.iter().filter(|r| r["path"].as_str().map(|p| p.ends_with("a.bin")).unwrap_or(false)).collect();
    assert_eq!(matching.len(), 1, "exactly one FileRecord should exist for the key: {records:?}");
    assert_eq!(matching[0]["status"], "done", "record must remain Done, not reprocessed into a new terminal state");
    assert_eq!(matching[0]["attempts"], 1, "attempts must not increase without an explicit requeue");

    let archived_entries: Vec<_> = std::fs::read_dir(ws.path("arc")).expect("read arc dir").filter_map(|e| e.ok()).collect();
    assert_eq!(archived_entries.len(), 1, "no second archive copy should be produced for an already-Done key");
}

fn state_records(ws: &Workspace) -> Vec<serde_json::Value> {
    let output = cronplusd(&["state", "list", "--state-store-location", ws.path("state").to_str().expect("utf8 path")]);
    serde_json::from_slice(&output.stdout).expect("state list should print JSON")
}
