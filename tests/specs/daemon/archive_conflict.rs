//! Scenario B (spec.md S8): archive rename conflict.

use crate::prelude::*;

#[test]
fn rename_conflict_preserves_existing_and_suffixes_new() {
    let ws = Workspace::new();
    ws.write_file("arc/doc.pdf", "old");

    let config = ws.write_config(&format!(
        r#"
[[tasks]]
id = "archive-rename"

[tasks.watch]
directory = {in_dir:?}
glob_pattern = "*.pdf"
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

    let daemon = Daemon::spawn(&config);

    ws.write_file("in/doc.pdf", "new");

    let renamed_sibling_appeared = wait_for(WAIT_MAX_MS, || {
        std::fs::read_dir(ws.path("arc"))
            .map(|entries| entries.filter_map(|e| e.ok()).count() >= 2)
            .unwrap_or(false)
    });
    assert!(renamed_sibling_appeared, "a second archived file should appear alongside doc.pdf");

    daemon.stop();

    assert_eq!(ws.read("arc/doc.pdf"), "old", "pre-existing file must be untouched");

    let renamed = std::fs::read_dir(ws.path("arc"))
        .expect("read arc dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .find(|name| name != "doc.pdf")
        .expect("renamed sibling should exist");

    assert!(renamed.starts_with("doc-"), "renamed file should keep the basename: {renamed}");
    assert!(renamed.ends_with(".pdf"), "renamed file should keep the extension: {renamed}");
    let suffix = renamed.trim_start_matches("doc-").trim_end_matches(".pdf");
    assert_eq!(suffix.len(), 8, "suffix should be 8 hex characters: {renamed}");
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()), "suffix should be lowercase hex: {renamed}");

    let contents = std::fs::read_to_string(ws.path("arc").join(&renamed)).expect("read renamed file");
    assert_eq!(contents, "new");
}
