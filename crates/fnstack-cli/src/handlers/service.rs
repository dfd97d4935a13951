//! Service-level handlers

use axum::{http::StatusCode, response::IntoResponse};

/// Format of the `/time` response, e.g. `7 Mar 2025, 14:05:09`
pub const TIME_FORMAT: &str = "%-d %b %Y, %H:%M:%S";

/// HEAD / and GET /health - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /time - Current server time
pub async fn current_time() -> impl IntoResponse {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}
