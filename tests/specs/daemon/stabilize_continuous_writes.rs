//! Scenario E (spec.md S8): stabilization under continuous writes.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn appends_during_debounce_window_yield_exactly_one_archive_with_final_size() {
    let ws = Workspace::new();

    let config = ws.write_config(&format!(
        r#"
[[tasks]]
id = "stabilize-writes"

[tasks.watch]
directory = {in_dir:?}
glob_pattern = "*.bin"
debounce_milliseconds = 100
stabilization_milliseconds = 200

[[tasks.pipeline]]
name = "archive-it"
type = "archive"
destination_directory = {arc_dir:?}
conflict_strategy = "rename"
"#,
        in_dir = ws.path("in"),
        arc_dir = ws.path("arc"),
    ));

    let daemon = Daemon::spawn(&config);

    let path = ws.path("in/log.bin");
    let mut written = Vec::new();
    for _ in 0..8 {
        written.push(b'x');
        std::fs::write(&path, &written).expect("append byte");
        std::thread::sleep(Duration::from_millis(80));
    }
    let final_size = written.len() as u64;

    let archived = wait_for(WAIT_MAX_MS, || {
        std::fs::read_dir(ws.path("arc")).map(|entries| entries.filter_map(|e| e.ok()).count() >= 1).unwrap_or(false)
    });
    assert!(archived, "exactly one archived file should appear once writes stop");

    // Give any spurious second stabilization a moment to show up, if the
    // watcher were (incorrectly) to emit on an intermediate size.
    std::thread::sleep(Duration::from_millis(300));
    daemon.stop();

    let entries: Vec<_> = std::fs::read_dir(ws.path("arc")).expect("read arc dir").filter_map(|e| e.ok()).collect();
    assert_eq!(entries.len(), 1, "only one stabilized event should have been archived");

    let archived_path = entries[0].path();
    let metadata = std::fs::metadata(&archived_path).expect("archived file metadata");
    assert_eq!(metadata.len(), final_size, "archived file should have the final, post-write size");
}
