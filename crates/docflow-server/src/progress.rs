//! Transient per-file progress tracking.
//!
//! The tracker is the source of truth for files whose upload or
//! extraction task is still running in this process. It holds one entry
//! per file id in a sharded concurrent map; entry reads and writes are
//! atomic per key, so readers never observe a torn status/percent pair.
//!
//! Entries are not durable. After a restart the map is empty and status
//! queries fall back to the lifecycle record, which always wins.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

use crate::models::FileStatus;

/// Status and percent for one in-flight (or recently finished) file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub status: FileStatus,
    pub progress: u8,
}

/// Process-wide map of file id -> [`ProgressEntry`].
///
/// Cheap to clone; all clones share the same map.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    entries: Arc<DashMap<String, ProgressEntry>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh upload at `{uploading, 0}`.
    pub fn begin_upload(&self, file_id: &str) {
        self.entries.insert(
            file_id.to_string(),
            ProgressEntry {
                status: FileStatus::Uploading,
                progress: 0,
            },
        );
    }

    /// Raise the percent for an active file. Percent is clamped to 100
    /// and never decreases within the current phase; stale or missing
    /// entries are ignored.
    pub fn update_percent(&self, file_id: &str, percent: u8) {
        if let Some(mut entry) = self.entries.get_mut(file_id) {
            entry.progress = entry.progress.max(percent.min(100));
        }
    }

    /// Mark extraction as started: `{processing, 0}`.
    ///
    /// Percent intentionally resets to 0 here, matching the documented
    /// upload-then-parse contract: percent is monotonic within a phase,
    /// not across phases.
    pub fn mark_processing(&self, file_id: &str) {
        self.entries.insert(
            file_id.to_string(),
            ProgressEntry {
                status: FileStatus::Processing,
                progress: 0,
            },
        );
    }

    /// Terminal success: `{ready, 100}`.
    pub fn mark_ready(&self, file_id: &str) {
        self.entries.insert(
            file_id.to_string(),
            ProgressEntry {
                status: FileStatus::Ready,
                progress: 100,
            },
        );
    }

    /// Terminal failure: `{failed, 0}`. Percent resets to 0 rather than
    /// keeping the last known value; documented source behavior.
    pub fn mark_failed(&self, file_id: &str) {
        self.entries.insert(
            file_id.to_string(),
            ProgressEntry {
                status: FileStatus::Failed,
                progress: 0,
            },
        );
    }

    pub fn get(&self, file_id: &str) -> Option<ProgressEntry> {
        self.entries.get(file_id).map(|e| *e)
    }

    /// Drop the entry for a deleted file.
    pub fn remove(&self, file_id: &str) {
        self.entries.remove(file_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_upload_starts_at_zero() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("f1");

        let entry = tracker.get("f1").unwrap();
        assert_eq!(entry.status, FileStatus::Uploading);
        assert_eq!(entry.progress, 0);
    }

    #[test]
    fn test_percent_is_monotonic_within_phase() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("f1");

        tracker.update_percent("f1", 40);
        tracker.update_percent("f1", 20); // stale update must not regress
        assert_eq!(tracker.get("f1").unwrap().progress, 40);

        tracker.update_percent("f1", 250); // clamped
        assert_eq!(tracker.get("f1").unwrap().progress, 100);
    }

    #[test]
    fn test_processing_resets_percent() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("f1");
        tracker.update_percent("f1", 100);

        tracker.mark_processing("f1");
        let entry = tracker.get("f1").unwrap();
        assert_eq!(entry.status, FileStatus::Processing);
        assert_eq!(entry.progress, 0);
    }

    #[test]
    fn test_terminal_states() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("ok");
        tracker.mark_ready("ok");
        assert_eq!(
            tracker.get("ok").unwrap(),
            ProgressEntry {
                status: FileStatus::Ready,
                progress: 100
            }
        );

        tracker.begin_upload("bad");
        tracker.update_percent("bad", 80);
        tracker.mark_failed("bad");
        assert_eq!(
            tracker.get("bad").unwrap(),
            ProgressEntry {
                status: FileStatus::Failed,
                progress: 0
            }
        );
    }

    #[test]
    fn test_remove_and_missing_updates() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("f1");
        tracker.remove("f1");
        assert!(tracker.get("f1").is_none());

        // Updates for unknown ids are ignored, not inserted.
        tracker.update_percent("ghost", 50);
        assert!(tracker.get("ghost").is_none());
    }

    #[test]
    fn test_entries_are_independent() {
        let tracker = ProgressTracker::new();
        tracker.begin_upload("a");
        tracker.begin_upload("b");
        tracker.update_percent("a", 70);

        assert_eq!(tracker.get("a").unwrap().progress, 70);
        assert_eq!(tracker.get("b").unwrap().progress, 0);
    }
}
