//! Extracted content query.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::FileStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetContentQuery {
    pub file_id: String,
}

/// Either the extracted records, or a non-error indicator that the file
/// has not reached `ready`. Serializes as a bare JSON array or as
/// `{"message": ...}` respectively.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GetContentResponse {
    Ready(Vec<serde_json::Value>),
    Pending { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GetContentError {
    #[error("File not found")]
    NotFound,
    #[error("Parsed content missing for ready file")]
    ContentMissing,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(db))]
pub async fn handle(
    db: SqlitePool,
    query: GetContentQuery,
) -> Result<GetContentResponse, GetContentError> {
    let row: Option<(String, Option<Json<Vec<serde_json::Value>>>)> =
        sqlx::query_as("SELECT status, parsed_content FROM files WHERE id = ?")
            .bind(&query.file_id)
            .fetch_optional(&db)
            .await?;

    let (status, content) = row.ok_or(GetContentError::NotFound)?;

    if FileStatus::from(status) != FileStatus::Ready {
        return Ok(GetContentResponse::Pending {
            message: "File upload or processing in progress. Please try again later.".to_string(),
        });
    }

    let content = content.ok_or(GetContentError::ContentMissing)?;
    Ok(GetContentResponse::Ready(content.0))
}
