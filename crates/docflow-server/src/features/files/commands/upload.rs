//! Upload finalization command.
//!
//! Runs after the raw bytes are fully streamed into blob storage:
//! inserts the durable lifecycle record at `processing` and submits the
//! extraction job. The HTTP layer owns the streaming itself (see
//! `routes.rs`); no record exists for uploads that fail mid-stream.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::FileStatus;
use crate::parsing::{ParseJob, ParseQueue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileCommand {
    pub file_id: String,
    pub filename: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub file_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadFileError {
    #[error("Filename is required and cannot be empty")]
    FilenameRequired,
    #[error("Filename must not exceed 255 characters")]
    FilenameLength,
    #[error("Upload failed: {0}")]
    Upload(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Could not schedule extraction: {0}")]
    Dispatch(#[from] crate::parsing::SubmitError),
}

impl UploadFileCommand {
    pub fn validate(&self) -> Result<(), UploadFileError> {
        if self.filename.trim().is_empty() {
            return Err(UploadFileError::FilenameRequired);
        }
        if self.filename.len() > 255 {
            return Err(UploadFileError::FilenameLength);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(db, parse_queue))]
pub async fn handle(
    db: SqlitePool,
    parse_queue: ParseQueue,
    command: UploadFileCommand,
) -> Result<UploadFileResponse, UploadFileError> {
    command.validate()?;

    sqlx::query(
        "INSERT INTO files (id, filename, status, created_at, storage_key) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&command.file_id)
    .bind(&command.filename)
    .bind(FileStatus::Processing.as_str())
    .bind(Utc::now())
    .bind(&command.storage_key)
    .execute(&db)
    .await?;

    let submitted = parse_queue.submit(ParseJob {
        file_id: command.file_id.clone(),
        storage_key: command.storage_key,
        filename: command.filename,
    });

    // A record that never reaches the queue would sit at `processing`
    // forever and outlive its blob; take it back out instead.
    if let Err(e) = submitted {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(&command.file_id)
            .execute(&db)
            .await?;
        return Err(e.into());
    }

    tracing::info!(file_id = %command.file_id, "Upload recorded, extraction scheduled");

    Ok(UploadFileResponse {
        file_id: command.file_id,
    })
}
