//! Upload endpoint.
//!
//! `POST /upload` takes a multipart form, stores the `file` field under a
//! fresh object name and answers with where it went.

use std::io;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::post,
};
use bytes::Bytes;
use futures::stream;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use upgate_core::storage::{ObjectName, Uploader};
use upgate_shared::{AppError, AppResult};

use crate::{AppState, error::ApiError};

/// Form field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Creates the upload route with its body limit.
pub fn routes<U: Uploader>(upload_limit_bytes: usize) -> Router<AppState<U>> {
    Router::new()
        .route("/upload", post(upload_file::<U>))
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
}

/// Response for a stored upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Object name in the bucket.
    pub name: String,
    /// Display URL of the object.
    pub url: String,
    /// Stored size in bytes.
    pub size: u64,
}

/// The extracted `file` field.
struct FilePart {
    filename: String,
    data: Bytes,
}

/// POST `/upload`
async fn upload_file<U: Uploader>(
    State(state): State<AppState<U>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = match read_file_field(multipart).await {
        Ok(file) => file,
        Err(err) => {
            warn!(error = %err, "rejected upload");
            return Err(err.into());
        }
    };

    let name = ObjectName::generate(&file.filename);
    let size = file.data.len() as u64;
    let content = stream::iter([Ok::<_, io::Error>(file.data)]);

    match state.uploader.upload(name.as_str(), content, size).await {
        Ok(url) => {
            info!(object = %name, size, "upload stored");
            Ok(Json(UploadResponse {
                name: name.to_string(),
                url,
                size,
            }))
        }
        Err(err) => {
            error!(error = %err, object = %name, "upload failed");
            Err(AppError::ExternalService(err.to_string()).into())
        }
    }
}

/// Finds the first `file` field that carries a filename and reads it.
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<FilePart> {
    let mut multipart = multipart.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file.
        let Some(filename) = field.file_name().and_then(base_name) else {
            continue;
        };

        let data = field.bytes().await.map_err(field_error)?;
        return Ok(FilePart { filename, data });
    }

    Err(AppError::Validation(format!(
        "no file uploaded in form field '{FILE_FIELD}'"
    )))
}

fn field_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

/// Final path component of a client-supplied filename.
fn base_name(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    (!name.is_empty()).then(|| name.to_string())
}
