//! Bounded, timestamped narration buffer.
//!
//! Services append human-readable lines here as they work; the host can list,
//! clear or export them. The buffer keeps the most recent entries only.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

/// Number of entries kept by default
pub const DEFAULT_CAPACITY: usize = 100;

/// A single log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl DebugLogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DebugLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

/// Append-only log with FIFO eviction
pub struct DebugLog {
    entries: Mutex<VecDeque<DebugLogEntry>>,
    capacity: usize,
    export_path: PathBuf,
}

impl DebugLog {
    /// Create a log holding `DEFAULT_CAPACITY` entries
    pub fn new(export_path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, export_path)
    }

    /// Create a log holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize, export_path: impl Into<PathBuf>) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            export_path: export_path.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DebugLogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message, evicting the oldest entries past capacity
    pub fn log(&self, message: impl Into<String>) {
        let entry = DebugLogEntry::new(message);
        debug!(target: "clipshare::debug_log", "{}", entry.message);

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// All entries, oldest first
    pub fn get_all(&self) -> Vec<DebugLogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Render every entry, newline-joined
    pub fn render(&self) -> String {
        self.lock()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write every entry to the export file and return its location
    pub async fn export_to_file(&self) -> Result<PathBuf> {
        let content = self.render();

        if let Some(parent) = self.export_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        fs::write(&self.export_path, content).await.with_context(|| {
            format!("Failed to export debug log: {}", self.export_path.display())
        })?;

        self.log(format!("Debug log exported to {}", self.export_path.display()));
        Ok(self.export_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_in_insertion_order() {
        let log = DebugLog::new("/tmp/unused.log");
        log.log("first");
        log.log("second");

        let entries = log.get_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_small_capacity_evicts_oldest() {
        let log = DebugLog::with_capacity(3, "/tmp/unused.log");
        for i in 0..5 {
            log.log(format!("message {}", i));
        }

        let messages: Vec<_> = log.get_all().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = DebugLog::with_capacity(0, "/tmp/unused.log");
        log.log("kept");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_clear() {
        let log = DebugLog::new("/tmp/unused.log");
        log.log("something");
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_entry_display() {
        let entry = DebugLogEntry {
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            message: "hello".to_string(),
        };
        assert_eq!(entry.to_string(), "[2024-05-01T10:00:00.000Z] hello");
    }
}
