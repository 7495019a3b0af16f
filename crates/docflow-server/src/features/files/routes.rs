use crate::api::response::ErrorResponse;
use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::commands::{DeleteFileCommand, UploadFileCommand, UploadFileError};
use super::queries::{GetContentQuery, GetProgressQuery, ListFilesQuery};
use super::{DeleteFileError, GetContentError, GetProgressError, ListFilesError};
use crate::features::FeatureState;
use crate::storage::StoredObject;

pub fn files_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(upload_file).get(list_files))
        .route("/:file_id", get(get_file_content).delete(delete_file))
        .route("/:file_id/progress", get(get_file_progress))
}

#[tracing::instrument(skip(state, headers, multipart))]
async fn upload_file(
    State(state): State<FeatureState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, FileApiError> {
    // Content-Length covers multipart framing too, so percentages derived
    // from it undershoot slightly. Good enough for a progress bar.
    let total_size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        FileApiError::UploadError(UploadFileError::Upload(anyhow::anyhow!(
            "Failed to read multipart field: {}",
            e
        )))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let file_id = Uuid::new_v4().simple().to_string();
        let command = UploadFileCommand {
            storage_key: state.storage.build_key(&file_id, &filename),
            file_id: file_id.clone(),
            filename,
        };
        command.validate()?;

        state.progress.begin_upload(&file_id);

        let stored = match stream_to_storage(&state, &mut field, &command, total_size).await {
            Ok(stored) => stored,
            Err(e) => {
                state.progress.mark_failed(&file_id);
                discard_blob(&state, &command.storage_key).await;
                return Err(FileApiError::UploadError(UploadFileError::Upload(e)));
            },
        };

        let response =
            match super::commands::upload::handle(state.db.clone(), state.parse_queue.clone(), command.clone())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    state.progress.mark_failed(&file_id);
                    discard_blob(&state, &command.storage_key).await;
                    return Err(e.into());
                },
            };

        tracing::info!(
            file_id = %response.file_id,
            size = stored.size,
            checksum = %stored.checksum,
            "File uploaded via API"
        );

        return Ok((StatusCode::OK, Json(response)).into_response());
    }

    Err(FileApiError::UploadError(UploadFileError::Upload(
        anyhow::anyhow!("No file field found in multipart data"),
    )))
}

/// Streams the multipart field into blob storage, reporting percent done
/// against the request's Content-Length when one was sent.
async fn stream_to_storage(
    state: &FeatureState,
    field: &mut Field<'_>,
    command: &UploadFileCommand,
    total_size: u64,
) -> Result<StoredObject, anyhow::Error> {
    let mut writer = state.storage.create(&command.storage_key).await?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read upload stream: {}", e))?
    {
        writer.write_chunk(&chunk).await?;
        if total_size > 0 {
            let percent = (writer.bytes_written().saturating_mul(100) / total_size).min(100) as u8;
            state.progress.update_percent(&command.file_id, percent);
        }
    }

    writer.finish().await
}

async fn discard_blob(state: &FeatureState, storage_key: &str) {
    if let Err(e) = state.storage.delete(storage_key).await {
        tracing::warn!(storage_key = %storage_key, "Failed to remove partial blob: {}", e);
    }
}

#[tracing::instrument(skip(state))]
async fn list_files(State(state): State<FeatureState>) -> Result<Response, FileApiError> {
    let files = super::queries::list::handle(state.db, ListFilesQuery {}).await?;
    Ok((StatusCode::OK, Json(files)).into_response())
}

#[tracing::instrument(skip(state), fields(file_id = %file_id))]
async fn get_file_progress(
    State(state): State<FeatureState>,
    Path(file_id): Path<String>,
) -> Result<Response, FileApiError> {
    let response =
        super::queries::get_progress::handle(state.db, state.progress, GetProgressQuery { file_id })
            .await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(state), fields(file_id = %file_id))]
async fn get_file_content(
    State(state): State<FeatureState>,
    Path(file_id): Path<String>,
) -> Result<Response, FileApiError> {
    let response = super::queries::get_content::handle(state.db, GetContentQuery { file_id }).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(state), fields(file_id = %file_id))]
async fn delete_file(
    State(state): State<FeatureState>,
    Path(file_id): Path<String>,
) -> Result<Response, FileApiError> {
    let response = super::commands::delete::handle(
        state.db,
        state.storage,
        state.progress,
        DeleteFileCommand { file_id },
    )
    .await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
enum FileApiError {
    UploadError(UploadFileError),
    DeleteError(DeleteFileError),
    ProgressError(GetProgressError),
    ContentError(GetContentError),
    ListError(ListFilesError),
}

impl From<UploadFileError> for FileApiError {
    fn from(err: UploadFileError) -> Self {
        Self::UploadError(err)
    }
}

impl From<DeleteFileError> for FileApiError {
    fn from(err: DeleteFileError) -> Self {
        Self::DeleteError(err)
    }
}

impl From<GetProgressError> for FileApiError {
    fn from(err: GetProgressError) -> Self {
        Self::ProgressError(err)
    }
}

impl From<GetContentError> for FileApiError {
    fn from(err: GetContentError) -> Self {
        Self::ContentError(err)
    }
}

impl From<ListFilesError> for FileApiError {
    fn from(err: ListFilesError) -> Self {
        Self::ListError(err)
    }
}

impl IntoResponse for FileApiError {
    fn into_response(self) -> Response {
        match self {
            FileApiError::UploadError(UploadFileError::FilenameRequired)
            | FileApiError::UploadError(UploadFileError::FilenameLength) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            FileApiError::UploadError(UploadFileError::Upload(_)) => {
                tracing::error!("Upload failed: {}", self);
                let error = ErrorResponse::new("UPLOAD_FAILED", "Failed to store uploaded file");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            FileApiError::UploadError(UploadFileError::Database(_))
            | FileApiError::UploadError(UploadFileError::Dispatch(_)) => {
                tracing::error!("Failed to record upload: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            FileApiError::DeleteError(DeleteFileError::NotFound)
            | FileApiError::ProgressError(GetProgressError::NotFound)
            | FileApiError::ContentError(GetContentError::NotFound) => {
                let error = ErrorResponse::new("NOT_FOUND", "File not found");
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },

            FileApiError::DeleteError(DeleteFileError::Storage(_)) => {
                tracing::error!("Storage error during file deletion: {}", self);
                let error = ErrorResponse::new("STORAGE_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            FileApiError::ContentError(GetContentError::ContentMissing) => {
                tracing::error!("Inconsistent record: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            FileApiError::DeleteError(DeleteFileError::Database(_))
            | FileApiError::ProgressError(GetProgressError::Database(_))
            | FileApiError::ContentError(GetContentError::Database(_))
            | FileApiError::ListError(ListFilesError::Database(_)) => {
                tracing::error!("Database error: {}", self);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for FileApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UploadError(e) => write!(f, "{}", e),
            Self::DeleteError(e) => write!(f, "{}", e),
            Self::ProgressError(e) => write!(f, "{}", e),
            Self::ContentError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
        }
    }
}
