//! Parse worker: consumes [`ParseJob`]s and runs extraction to a
//! terminal status.

use sqlx::sqlite::SqlitePool;
use sqlx::types::Json;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use super::ParseJob;
use crate::extract::{self, ExtractError};
use crate::models::FileStatus;
use crate::progress::ProgressTracker;
use crate::storage::Storage;

#[derive(Debug, Error)]
enum ParseJobError {
    #[error("Blob read failed: {0}")]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Dispatch loop for background extraction.
///
/// `start` consumes the receiver half of a [`super::ParseQueue`] and
/// spawns one task per job. The loop ends when every queue handle is
/// dropped, which only happens at server shutdown.
#[derive(Clone)]
pub struct ParseWorker {
    db: SqlitePool,
    storage: Storage,
    progress: ProgressTracker,
}

impl ParseWorker {
    pub fn new(db: SqlitePool, storage: Storage, progress: ProgressTracker) -> Self {
        Self {
            db,
            storage,
            progress,
        }
    }

    pub fn start(self, mut rx: mpsc::UnboundedReceiver<ParseJob>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("Parse worker started");

            while let Some(job) = rx.recv().await {
                let worker = self.clone();
                tokio::spawn(async move {
                    worker.run_job(job).await;
                });
            }

            info!("Parse worker stopped");
        })
    }

    /// Run one extraction to its terminal status. Never returns an
    /// error: failures become `status = failed` on the record and in
    /// the tracker, and are otherwise only logged.
    #[instrument(skip(self), fields(file_id = %job.file_id, filename = %job.filename))]
    pub async fn run_job(&self, job: ParseJob) {
        self.progress.mark_processing(&job.file_id);

        match self.parse_blob(&job).await {
            Ok(records) => {
                info!(records = records.len(), "Extraction succeeded");
                // content and status move together in one statement, so
                // a ready record always has its content.
                let updated = sqlx::query(
                    "UPDATE files SET parsed_content = ?, status = ? WHERE id = ?",
                )
                .bind(Json(&records))
                .bind(FileStatus::Ready.as_str())
                .bind(&job.file_id)
                .execute(&self.db)
                .await;

                match updated {
                    Ok(_) => self.progress.mark_ready(&job.file_id),
                    Err(e) => {
                        error!(error = %e, "Failed to store extracted content");
                        self.fail_record(&job.file_id).await;
                    },
                }
            },
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                self.fail_record(&job.file_id).await;
            },
        }
    }

    async fn parse_blob(&self, job: &ParseJob) -> Result<Vec<serde_json::Value>, ParseJobError> {
        let bytes = self.storage.download(&job.storage_key).await?;
        self.progress.update_percent(&job.file_id, 25);

        let records = extract::extract(&bytes, &job.filename)?;
        self.progress.update_percent(&job.file_id, 90);

        Ok(records)
    }

    /// Terminal failure path. The durable record is written first; the
    /// tracker update follows so the record stays authoritative even if
    /// the process dies in between.
    async fn fail_record(&self, file_id: &str) {
        let result = sqlx::query("UPDATE files SET status = ? WHERE id = ?")
            .bind(FileStatus::Failed.as_str())
            .bind(file_id)
            .execute(&self.db)
            .await;

        if let Err(e) = result {
            error!(file_id = %file_id, error = %e, "Failed to mark record as failed");
        }

        self.progress.mark_failed(file_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::StorageConfig;
    use chrono::Utc;

    async fn setup(pool: &SqlitePool) -> (tempfile::TempDir, ParseWorker, ProgressTracker) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(StorageConfig::with_root(dir.path()))
            .await
            .unwrap();
        let progress = ProgressTracker::new();
        let worker = ParseWorker::new(pool.clone(), storage, progress.clone());
        (dir, worker, progress)
    }

    async fn insert_processing_record(pool: &SqlitePool, id: &str, filename: &str, key: &str) {
        sqlx::query(
            "INSERT INTO files (id, filename, status, created_at, storage_key) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(filename)
        .bind(FileStatus::Processing.as_str())
        .bind(Utc::now())
        .bind(key)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn store_blob(worker: &ParseWorker, key: &str, bytes: &[u8]) {
        let mut writer = worker.storage.create(key).await.unwrap();
        writer.write_chunk(bytes).await.unwrap();
        writer.finish().await.unwrap();
    }

    #[sqlx::test]
    async fn test_csv_job_reaches_ready(pool: SqlitePool) {
        let (_dir, worker, progress) = setup(&pool).await;
        insert_processing_record(&pool, "f1", "a.csv", "f1_a.csv").await;
        store_blob(&worker, "f1_a.csv", b"x\n1\n2\n").await;

        worker
            .run_job(ParseJob {
                file_id: "f1".to_string(),
                storage_key: "f1_a.csv".to_string(),
                filename: "a.csv".to_string(),
            })
            .await;

        let record: crate::models::FileRecord =
            sqlx::query_as("SELECT * FROM files WHERE id = ?")
                .bind("f1")
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(record.file_status(), FileStatus::Ready);
        let content = record.parsed_content.unwrap().0;
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["x"], 1);

        let entry = progress.get("f1").unwrap();
        assert_eq!(entry.status, FileStatus::Ready);
        assert_eq!(entry.progress, 100);
    }

    #[sqlx::test]
    async fn test_unsupported_suffix_reaches_failed(pool: SqlitePool) {
        let (_dir, worker, progress) = setup(&pool).await;
        insert_processing_record(&pool, "f2", "b.tiff", "f2_b.tiff").await;
        store_blob(&worker, "f2_b.tiff", b"not an image we parse").await;

        worker
            .run_job(ParseJob {
                file_id: "f2".to_string(),
                storage_key: "f2_b.tiff".to_string(),
                filename: "b.tiff".to_string(),
            })
            .await;

        let record: crate::models::FileRecord =
            sqlx::query_as("SELECT * FROM files WHERE id = ?")
                .bind("f2")
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(record.file_status(), FileStatus::Failed);
        assert!(record.parsed_content.is_none());

        let entry = progress.get("f2").unwrap();
        assert_eq!(entry.status, FileStatus::Failed);
        assert_eq!(entry.progress, 0);
    }

    #[sqlx::test]
    async fn test_missing_blob_reaches_failed(pool: SqlitePool) {
        let (_dir, worker, _progress) = setup(&pool).await;
        insert_processing_record(&pool, "f3", "c.csv", "f3_c.csv").await;

        worker
            .run_job(ParseJob {
                file_id: "f3".to_string(),
                storage_key: "f3_c.csv".to_string(),
                filename: "c.csv".to_string(),
            })
            .await;

        let status: (String,) = sqlx::query_as("SELECT status FROM files WHERE id = ?")
            .bind("f3")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status.0, "failed");
    }

    #[sqlx::test]
    async fn test_malformed_csv_reaches_failed(pool: SqlitePool) {
        let (_dir, worker, _progress) = setup(&pool).await;
        insert_processing_record(&pool, "f4", "d.csv", "f4_d.csv").await;
        store_blob(&worker, "f4_d.csv", b"a,b\n1\n").await;

        worker
            .run_job(ParseJob {
                file_id: "f4".to_string(),
                storage_key: "f4_d.csv".to_string(),
                filename: "d.csv".to_string(),
            })
            .await;

        let status: (String,) = sqlx::query_as("SELECT status FROM files WHERE id = ?")
            .bind("f4")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status.0, "failed");
    }
}
