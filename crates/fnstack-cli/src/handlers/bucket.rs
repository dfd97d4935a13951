//! Bucket operation handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// POST /bucket/{name} - Create a bucket unless it already exists
pub async fn ensure_bucket(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    state.gateway.ensure_bucket(&name).await?;

    Ok((StatusCode::OK, format!("Have created bucket {name}")).into_response())
}

/// GET /buckets - Names of every bucket in the store, sorted
pub async fn list_buckets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.gateway.list_buckets().await?))
}
