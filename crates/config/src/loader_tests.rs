// SPDX-License-Identifier: MIT

use super::*;

const SAMPLE_TOML: &str = r#"
[runtime]
state_store_location = "/var/lib/cronplus/state.db"
dead_letter_location = "/var/lib/cronplus/dlq.db"

[[tasks]]
id = "tsk-sample0000000000"
enabled = true

[tasks.watch]
directory = "/in"
glob_pattern = "*.txt"

[[tasks.pipeline]]
name = "copy-out"
type = "copy"
destination_directory = "/out"
atomic = true
verify_checksum = true

[[tasks.pipeline]]
name = "cleanup"
type = "delete"
"#;

#[test]
fn loads_and_validates_a_sample_document() {
    let config = load_from_toml(SAMPLE_TOML).expect("parse sample document");
    validate(&config).expect("sample document should be valid");
    assert_eq!(config.tasks.len(), 1);
    assert_eq!(config.tasks[0].pipeline.len(), 2);
    assert_eq!(config.runtime.default_concurrency, 4);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cronplus.yaml");
    std::fs::write(&path, "tasks = []").expect("write");
    let err = load_from_path(&path).expect_err("unknown extension must be rejected");
    assert!(matches!(err, ConfigError::UnknownFormat { .. }));
}

#[test]
fn loads_from_path_with_toml_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cronplus.toml");
    std::fs::write(&path, SAMPLE_TOML).expect("write");
    let config = load_from_path(&path).expect("load from path");
    assert_eq!(config.tasks.len(), 1);
}
