//! File listing query.
//!
//! Rows come back in insertion order (`created_at`, then id as a
//! tiebreaker), which is stable within a process run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilesQuery {}

/// One file projected for listings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListedFile {
    pub id: String,
    pub filename: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListFilesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(db))]
pub async fn handle(
    db: SqlitePool,
    _query: ListFilesQuery,
) -> Result<Vec<ListedFile>, ListFilesError> {
    let files = sqlx::query_as::<_, ListedFile>(
        "SELECT id, filename, status, created_at FROM files ORDER BY created_at, id",
    )
    .fetch_all(&db)
    .await?;

    Ok(files)
}
