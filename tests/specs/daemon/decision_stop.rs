//! Scenario D (spec.md S8): decision branch stop.

use crate::prelude::*;

#[test]
fn small_file_stops_before_copy() {
    let ws = Workspace::new();
    let config = ws.write_config(&format!(
        r#"
[[tasks]]
id = "decision-stop"

[tasks.watch]
directory = {in_dir:?}
glob_pattern = "*.bin"
debounce_milliseconds = 50
stabilization_milliseconds = 50

[[tasks.variables]]
name = "threshold"
scope = "task"
value = {{ integer = 1024 }}

[[tasks.pipeline]]
name = "check-size"
type = "decision"
expression = "file.size < vars.threshold"
true_action = "stop"
false_action = "continue"

[[tasks.pipeline]]
name = "copy-out"
type = "copy"
destination_directory = {out_dir:?}
"#,
        in_dir = ws.path("in"),
        out_dir = ws.path("out"),
    ));

    let daemon = Daemon::spawn(&config);

    ws.write_file("in/small.bin", &"x".repeat(500));

    // The file should stabilize and be marked Done without ever being copied.
    let settled = wait_for(WAIT_MAX_MS, || {
        let output = cronplusd(&[
            "state",
            "list",
            "--state-store-location",
            ws.path("state").to_str().expect("utf8 path"),
        ]);
        String::from_utf8_lossy(&output.stdout).contains("\"done\"")
    });
    assert!(settled, "execution should reach Done via the stop branch");

    daemon.stop();

    assert!(!ws.exists("out/small.bin"), "decision stop must prevent the later copy step");
}
