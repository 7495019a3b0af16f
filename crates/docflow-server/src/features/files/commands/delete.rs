//! File deletion command.
//!
//! Removes the blob first, then the record, then the tracker entry, so a
//! surviving record never points at missing bytes. A missing blob is
//! tolerated; a missing record is `NotFound`.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::progress::ProgressTracker;
use crate::storage::Storage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileCommand {
    pub file_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteFileError {
    #[error("File not found")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(db, storage, progress))]
pub async fn handle(
    db: SqlitePool,
    storage: Storage,
    progress: ProgressTracker,
    command: DeleteFileCommand,
) -> Result<DeleteFileResponse, DeleteFileError> {
    let storage_key: Option<(String,)> =
        sqlx::query_as("SELECT storage_key FROM files WHERE id = ?")
            .bind(&command.file_id)
            .fetch_optional(&db)
            .await?;

    let (storage_key,) = storage_key.ok_or(DeleteFileError::NotFound)?;

    storage.delete(&storage_key).await?;

    sqlx::query("DELETE FROM files WHERE id = ?")
        .bind(&command.file_id)
        .execute(&db)
        .await?;

    progress.remove(&command.file_id);

    tracing::info!(file_id = %command.file_id, "File deleted");

    Ok(DeleteFileResponse {
        message: "File deleted".to_string(),
    })
}
