//! Debug Log Integration Tests
//!
//! Tests for bounded retention and export.

use clipshare::core::{DebugLog, DEFAULT_CAPACITY};
use tempfile::TempDir;

#[test]
fn test_oldest_entry_evicted_past_capacity() {
    let log = DebugLog::new("/tmp/unused.log");

    for i in 1..=101 {
        log.log(format!("message {}", i));
    }

    let entries = log.get_all();
    assert_eq!(entries.len(), DEFAULT_CAPACITY);
    assert_eq!(entries.first().unwrap().message, "message 2");
    assert_eq!(entries.last().unwrap().message, "message 101");
}

#[test]
fn test_clear_empties_log() {
    let log = DebugLog::with_capacity(5, "/tmp/unused.log");
    log.log("one");
    log.clear();

    assert!(log.is_empty());
    log.log("two");
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_export_writes_newline_joined_entries() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("shared").join("sharing_service_debug.log");
    let log = DebugLog::new(&path);

    log.log("first");
    log.log("second");

    let exported = log.export_to_file().await.unwrap();
    assert_eq!(exported, path);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));
    assert!(lines[0].starts_with('['));

    // The export itself is narrated after the file is written
    assert!(log
        .get_all()
        .last()
        .unwrap()
        .message
        .starts_with("Debug log exported to"));
}

#[tokio::test]
async fn test_export_failure_propagates() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let log = DebugLog::new(blocker.join("debug.log"));
    log.log("entry");

    assert!(log.export_to_file().await.is_err());
    assert_eq!(log.len(), 1);
}
