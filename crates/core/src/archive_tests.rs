// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::Task;

#[test]
fn archive_entry_flattens_task_fields_at_top_level() {
    let task = Task::default();
    let entry = ArchiveEntry::new(task.clone(), "2026-02-01T00:00:00Z", 3.5, ArchiveSource::Auto);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["id"], "T001");
    assert_eq!(json["_archive"]["archiveSource"], "auto");
    assert_eq!(json["_archive"]["cycleTimeDays"], 3.5);
}

#[test]
fn restoring_clears_completed_at() {
    let mut task = Task::default();
    task.completed_at = Some("2026-02-01T00:00:00Z".to_string());
    let entry = ArchiveEntry::new(task, "2026-02-02T00:00:00Z", 1.0, ArchiveSource::Manual);
    let restored = entry.into_restored_task();
    assert!(restored.completed_at.is_none());
}

#[test]
fn archive_entry_roundtrips_through_json() {
    let entry = ArchiveEntry::new(Task::default(), "2026-02-01T00:00:00Z", 0.0, ArchiveSource::Force);
    let json = serde_json::to_string(&entry).unwrap();
    let back: ArchiveEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(entry, back);
}
