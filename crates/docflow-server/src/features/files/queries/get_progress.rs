//! Progress query.
//!
//! The transient tracker is authoritative while a task for the file is
//! active in this process. When no entry exists (finished long ago, or
//! the process restarted), the durable record answers instead, with
//! percent synthesized from its terminal status.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::FileStatus;
use crate::progress::ProgressTracker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProgressQuery {
    pub file_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProgressResponse {
    pub file_id: String,
    pub status: FileStatus,
    pub progress: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum GetProgressError {
    #[error("File not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(db, progress))]
pub async fn handle(
    db: SqlitePool,
    progress: ProgressTracker,
    query: GetProgressQuery,
) -> Result<GetProgressResponse, GetProgressError> {
    if let Some(entry) = progress.get(&query.file_id) {
        return Ok(GetProgressResponse {
            file_id: query.file_id,
            status: entry.status,
            progress: entry.progress,
        });
    }

    let status: Option<(String,)> = sqlx::query_as("SELECT status FROM files WHERE id = ?")
        .bind(&query.file_id)
        .fetch_optional(&db)
        .await?;

    let (status,) = status.ok_or(GetProgressError::NotFound)?;
    let status = FileStatus::from(status);

    Ok(GetProgressResponse {
        file_id: query.file_id,
        progress: if status == FileStatus::Ready { 100 } else { 0 },
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn insert_record(pool: &SqlitePool, id: &str, status: &str) {
        sqlx::query(
            "INSERT INTO files (id, filename, status, created_at, storage_key) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind("a.csv")
        .bind(status)
        .bind(Utc::now())
        .bind(format!("{}_a.csv", id))
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test]
    async fn test_tracker_entry_wins(pool: SqlitePool) {
        let progress = ProgressTracker::new();
        progress.begin_upload("f1");
        progress.update_percent("f1", 42);

        // Record says ready; the live tracker entry is still authoritative.
        insert_record(&pool, "f1", "ready").await;

        let response = handle(
            pool,
            progress,
            GetProgressQuery {
                file_id: "f1".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.status, FileStatus::Uploading);
        assert_eq!(response.progress, 42);
    }

    #[sqlx::test]
    async fn test_fallback_synthesizes_percent(pool: SqlitePool) {
        insert_record(&pool, "done", "ready").await;
        insert_record(&pool, "broken", "failed").await;

        let response = handle(
            pool.clone(),
            ProgressTracker::new(),
            GetProgressQuery {
                file_id: "done".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.status, FileStatus::Ready);
        assert_eq!(response.progress, 100);

        let response = handle(
            pool,
            ProgressTracker::new(),
            GetProgressQuery {
                file_id: "broken".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.status, FileStatus::Failed);
        assert_eq!(response.progress, 0);
    }

    #[sqlx::test]
    async fn test_unknown_id_is_not_found(pool: SqlitePool) {
        let result = handle(
            pool,
            ProgressTracker::new(),
            GetProgressQuery {
                file_id: "ghost".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(GetProgressError::NotFound)));
    }
}
