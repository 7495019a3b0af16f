//! Shared domain types

use serde::{Deserialize, Serialize};

/// Lifecycle status of an uploaded file.
///
/// The durable record store only ever holds `Processing`, `Ready`, or
/// `Failed`; `Uploading` exists solely in the transient progress tracker
/// while bytes are still being received.
///
/// `Ready` and `Failed` are terminal: nothing transitions out of them
/// except deletion of the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploading => "uploading",
            FileStatus::Processing => "processing",
            FileStatus::Ready => "ready",
            FileStatus::Failed => "failed",
        }
    }

    /// Whether this status admits no further automatic transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Ready | FileStatus::Failed)
    }
}

impl From<String> for FileStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "uploading" => FileStatus::Uploading,
            "ready" => FileStatus::Ready,
            "failed" => FileStatus::Failed,
            _ => FileStatus::Processing,
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
