// SPDX-License-Identifier: MIT

//! Pure match predicate for one watch spec.
//!
//! Kept free of I/O and of `notify` types so the filter itself is a plain
//! function of (spec, candidate) and is exhaustively unit-testable — this is
//! the predicate the invariant "Watcher never emits an event whose path
//! fails the task's filter predicate" talks about.

use cronplus_core::{ChangeKind, WatchSpec};
use std::path::Path;

/// Metadata about a candidate path needed to decide whether it matches.
/// Size is `None` when the file no longer exists (e.g. a Deleted event).
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub relative_path: &'a Path,
    pub change_kind: ChangeKind,
    pub size_bytes: Option<u64>,
}

/// Whether `candidate` passes every predicate in `spec`.
pub fn matches(spec: &WatchSpec, candidate: &Candidate<'_>) -> bool {
    if !spec.watched_change_kinds.contains(&candidate.change_kind) {
        return false;
    }

    if !matches_glob(&spec.glob_pattern, candidate.relative_path) {
        return false;
    }

    if spec.exclude_patterns.iter().any(|pattern| matches_glob(pattern, candidate.relative_path)) {
        return false;
    }

    if !spec.extension_whitelist.is_empty() {
        let extension = candidate.relative_path.extension().and_then(|ext| ext.to_str());
        match extension {
            Some(ext) => {
                if !spec.extension_whitelist.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)) {
                    return false;
                }
            }
            None => return false,
        }
    }

    if let Some(size) = candidate.size_bytes {
        if let Some(min) = spec.min_file_size_bytes {
            if size < min {
                return false;
            }
        }
        if let Some(max) = spec.max_file_size_bytes {
            if size > max {
                return false;
            }
        }
    }

    true
}

/// Glob match, case-insensitive on platforms whose filesystem is typically
/// case-insensitive.
fn matches_glob(pattern: &str, path: &Path) -> bool {
    let options = glob::MatchOptions {
        case_sensitive: !cfg!(any(target_os = "windows", target_os = "macos")),
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    match glob::Pattern::new(pattern) {
        Ok(compiled) => compiled.matches_path_with(path, options),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
