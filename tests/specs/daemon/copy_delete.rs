//! Scenario A (spec.md S8): copy+delete happy path.

use crate::prelude::*;

#[test]
fn copy_then_delete_on_stabilized_arrival() {
    let ws = Workspace::new();
    let config = ws.write_config(&format!(
        r#"
[[tasks]]
id = "copy-delete"

[tasks.watch]
directory = {in_dir:?}
glob_pattern = "*.txt"
debounce_milliseconds = 50
stabilization_milliseconds = 50

[[tasks.pipeline]]
name = "copy-out"
type = "copy"
destination_directory = {out_dir:?}
atomic = true
verify_checksum = true

[[tasks.pipeline]]
name = "remove-source"
type = "delete"
"#,
        in_dir = ws.path("in"),
        out_dir = ws.path("out"),
    ));

    let daemon = Daemon::spawn(&config);

    ws.write_file("in/hello.txt", "hello");

    let copied = wait_for(WAIT_MAX_MS, || ws.exists("out/hello.txt"));
    assert!(copied, "destination file should appear");
    assert_eq!(ws.read("out/hello.txt"), "hello");

    let deleted = wait_for(WAIT_MAX_MS, || !ws.exists("in/hello.txt"));
    assert!(deleted, "source file should be removed after copy");

    daemon.stop();
}
