use super::*;
use chrono::Utc;

#[test]
fn list_returns_state_store_unavailable_for_missing_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("missing").join("deeper");
    let code = list(&nested, None, 10);
    assert_eq!(code, exit_code::STATE_STORE_UNAVAILABLE);
}

#[test]
fn requeue_missing_entry_reports_internal_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path()).expect("create dir");
    let code = requeue(&dir.path().to_path_buf(), &dir.path().to_path_buf(), 999);
    assert_eq!(code, exit_code::INTERNAL_ERROR);
}

#[test]
fn requeue_transitions_an_enqueued_entry_to_queued() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dlq_wal = dir.path().join("dead-letter.wal");
    let queue = DeadLetterQueue::open(&dlq_wal).expect("open dlq");
    let task_id = TaskId::new();
    let entry = queue.enqueue(&task_id, std::path::Path::new("/in/a.bin"), "abc123", 0, "boom", Utc::now()).expect("enqueue");

    let code = requeue(&dir.path().to_path_buf(), &dir.path().to_path_buf(), entry.id);
    assert_eq!(code, exit_code::CLEAN_STOP);

    let state_wal = dir.path().join("state.wal");
    let state_snapshot = dir.path().join("state.snapshot");
    let store = StateStore::open(&state_wal, &state_snapshot).expect("reopen state store");
    let record = store.get(&task_id, std::path::Path::new("/in/a.bin"), "abc123").expect("record exists");
    assert_eq!(record.status, FileStatus::Queued);
}
