use crate::prelude::*;

#[test]
fn valid_config_exits_clean_and_lists_tasks() {
    let ws = Workspace::new();
    let config = ws.write_config(
        r#"
[[tasks]]
id = "demo-task"

[tasks.watch]
directory = "/tmp"
glob_pattern = "*.txt"

[[tasks.pipeline]]
name = "archive-it"
type = "archive"
destination_directory = "/tmp"
conflict_strategy = "skip"
"#,
    );

    let output = cronplusd(&["validate", "--config", config.to_str().expect("utf8 path")]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 task(s) configured"), "stdout: {stdout}");
    assert!(stdout.contains("demo-task"), "stdout: {stdout}");
}

#[test]
fn missing_config_file_exits_with_bad_config_code() {
    let ws = Workspace::new();
    let missing = ws.path("does-not-exist.toml");
    let output = cronplusd(&["validate", "--config", missing.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn empty_pipeline_is_rejected() {
    let ws = Workspace::new();
    let config = ws.write_config(
        r#"
[[tasks]]
id = "empty-pipeline"
pipeline = []

[tasks.watch]
directory = "/tmp"
glob_pattern = "*.txt"
"#,
    );

    let output = cronplusd(&["validate", "--config", config.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty pipeline") || stderr.contains("pipeline"), "stderr: {stderr}");
}

#[test]
fn relative_watch_directory_is_rejected() {
    let ws = Workspace::new();
    let config = ws.write_config(
        r#"
[[tasks]]
id = "relative-dir"

[tasks.watch]
directory = "relative/path"
glob_pattern = "*.txt"

[[tasks.pipeline]]
name = "noop"
type = "archive"
destination_directory = "/tmp"
conflict_strategy = "skip"
"#,
    );

    let output = cronplusd(&["validate", "--config", config.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(64));
}
