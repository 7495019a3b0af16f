//! Database models

use chrono::{DateTime, Utc};
use sqlx::types::Json;

pub use docflow_common::FileStatus;

/// Durable lifecycle record for one uploaded file (maps to the `files` table).
///
/// `parsed_content` is present if and only if the status is `ready`; the
/// pair is always written in a single UPDATE so readers never observe one
/// without the other.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub storage_key: String,
    pub parsed_content: Option<Json<Vec<serde_json::Value>>>,
}

impl FileRecord {
    pub fn file_status(&self) -> FileStatus {
        FileStatus::from(self.status.clone())
    }
}
