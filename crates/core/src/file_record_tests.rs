// SPDX-License-Identifier: MIT

use super::*;
use std::path::PathBuf;

#[test]
fn content_fingerprint_is_deterministic() {
    let a = content_fingerprint(b"hello");
    let b = content_fingerprint(b"hello");
    assert_eq!(a, b);
}

#[test]
fn content_fingerprint_differs_for_different_content() {
    assert_ne!(content_fingerprint(b"hello"), content_fingerprint(b"world"));
}

#[test]
fn state_key_is_stable_for_same_inputs() {
    let task_id = TaskId::from_string("tsk-abc");
    let path = PathBuf::from("/in/hello.txt");
    let fp = content_fingerprint(b"hello");
    let k1 = StateKey::new(&task_id, &path, &fp);
    let k2 = StateKey::new(&task_id, &path, &fp);
    assert_eq!(k1, k2);
}

#[test]
fn state_key_differs_by_task_path_or_fingerprint() {
    let task_a = TaskId::from_string("tsk-a");
    let task_b = TaskId::from_string("tsk-b");
    let path = PathBuf::from("/in/hello.txt");
    let fp = content_fingerprint(b"hello");
    assert_ne!(StateKey::new(&task_a, &path, &fp), StateKey::new(&task_b, &path, &fp));

    let other_path = PathBuf::from("/in/other.txt");
    assert_ne!(StateKey::new(&task_a, &path, &fp), StateKey::new(&task_a, &other_path, &fp));
}

#[test]
fn queued_to_processing_is_legal() {
    assert!(FileStatus::Queued.can_transition_to(FileStatus::Processing));
}

#[test]
fn queued_to_done_is_illegal() {
    assert!(!FileStatus::Queued.can_transition_to(FileStatus::Done));
}

#[test]
fn failed_can_reenter_processing_on_explicit_retry() {
    assert!(FileStatus::Failed.can_transition_to(FileStatus::Processing));
}

#[test]
fn failed_can_be_requeued() {
    assert!(FileStatus::Failed.can_transition_to(FileStatus::Queued));
}

#[test]
fn done_is_terminal_except_for_idempotent_remark() {
    assert!(FileStatus::Done.can_transition_to(FileStatus::Done));
    assert!(!FileStatus::Done.can_transition_to(FileStatus::Processing));
    assert!(!FileStatus::Done.can_transition_to(FileStatus::Failed));
}
