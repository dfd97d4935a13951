//! File upload, download and listing handlers

use crate::error::ErrorCode;
use crate::{ApiError, AppState};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use fnstack_core::{FileMetadata, ObjectRecord};
use fnstack_store::DEFAULT_CONTENT_TYPE;
use std::sync::Arc;

/// POST /upload - Store a multipart form upload.
///
/// Form fields: `file` (the content), `filename` and `mimetype`. When the
/// text fields are absent, the file part's own name and type are used.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::malformed(e.body_text()))?;

    let mut content: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut mimetype: Option<String> = None;
    let mut part_filename: Option<String> = None;
    let mut part_mimetype: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                part_filename = field.file_name().map(str::to_string);
                part_mimetype = field.content_type().map(str::to_string);
                content = Some(field.bytes().await.map_err(form_error)?);
            }
            "filename" => filename = Some(field.text().await.map_err(form_error)?),
            "mimetype" => mimetype = Some(field.text().await.map_err(form_error)?),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    let filename = filename.or(part_filename).unwrap_or_default();
    let mimetype = mimetype.or(part_mimetype).unwrap_or_default();
    let metadata = match content {
        Some(data) => FileMetadata::new(data, filename, mimetype),
        None => FileMetadata::without_content(filename, mimetype),
    };

    let created = state.gateway.upload(&metadata).await?;
    tracing::info!(key = %created.key, size = created.size, "Uploaded file");

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /download/{key} - Return an object as an attachment
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let object = state.gateway.download(&key).await?;

    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&key)),
        ],
        object.data,
    )
        .into_response())
}

/// GET /list - List every object, sorted by key
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ObjectRecord>>, ApiError> {
    Ok(Json(state.gateway.list().await?))
}

fn form_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(ErrorCode::PayloadTooLarge, err.body_text())
    } else {
        ApiError::malformed(err.body_text())
    }
}

/// Plain `filename` for printable ASCII keys, RFC 5987 `filename*` otherwise
fn content_disposition(key: &str) -> HeaderValue {
    let plain = key
        .chars()
        .all(|c| (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ');
    let value = if plain {
        format!("attachment; filename=\"{key}\"")
    } else {
        format!("attachment; filename*=UTF-8''{}", urlencoding::encode(key))
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
