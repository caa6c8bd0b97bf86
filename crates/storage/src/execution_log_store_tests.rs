// SPDX-License-Identifier: MIT

use super::*;
use chrono::Utc;
use std::path::PathBuf;

fn entry(task_id: TaskId, status: ExecutionStatus) -> ExecutionLogEntry {
    ExecutionLogEntry {
        id: 0,
        task_id,
        file_path: PathBuf::from("/in/a.txt"),
        status,
        started_at: Utc::now(),
        completed_at: None,
        error_message: None,
        step_details: Vec::new(),
    }
}

#[test]
fn append_assigns_ids_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = ExecutionLogStore::open(dir.path().join("exec.wal")).unwrap();
    let task = TaskId::new();

    let first = log.append(entry(task.clone(), ExecutionStatus::Running)).unwrap();
    let second = log.append(entry(task, ExecutionStatus::Success)).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
}

#[test]
fn list_filters_by_task_and_status_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let log = ExecutionLogStore::open(dir.path().join("exec.wal")).unwrap();
    let task_a = TaskId::new();
    let task_b = TaskId::new();

    log.append(entry(task_a.clone(), ExecutionStatus::Failed)).unwrap();
    log.append(entry(task_b, ExecutionStatus::Success)).unwrap();
    log.append(entry(task_a.clone(), ExecutionStatus::Success)).unwrap();

    let filter = LogFilter { task_id: Some(task_a), status: Some(ExecutionStatus::Success) };
    let results = log.list(&filter, 0, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 3);
}

#[test]
fn list_paginates_with_offset_and_page_size() {
    let dir = tempfile::tempdir().unwrap();
    let log = ExecutionLogStore::open(dir.path().join("exec.wal")).unwrap();
    let task = TaskId::new();
    for _ in 0..5 {
        log.append(entry(task.clone(), ExecutionStatus::Success)).unwrap();
    }

    let page = log.list(&LogFilter::default(), 1, 2);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, 4);
    assert_eq!(page[1].id, 3);
}

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exec.wal");
    let task = TaskId::new();
    {
        let log = ExecutionLogStore::open(&path).unwrap();
        log.append(entry(task, ExecutionStatus::Success)).unwrap();
    }

    let reopened = ExecutionLogStore::open(&path).unwrap();
    assert_eq!(reopened.list(&LogFilter::default(), 0, 10).len(), 1);
}
