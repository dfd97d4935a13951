//! Error types and service error codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::middleware::{current_request_id, REQUEST_ID_HEADER};
use fnstack_core::CoreError;
use fnstack_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Service error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MalformedRequest,
    MissingContent,
    InvalidFilename,
    InvalidMimetype,
    NoSuchBucket,
    NoSuchKey,
    PayloadTooLarge,
    SlowDown,
    UpstreamTimeout,
    StoreUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "MalformedRequest",
            Self::MissingContent => "MissingContent",
            Self::InvalidFilename => "InvalidFilename",
            Self::InvalidMimetype => "InvalidMimetype",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::SlowDown => "SlowDown",
            Self::UpstreamTimeout => "UpstreamTimeout",
            Self::StoreUnavailable => "StoreUnavailable",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
            Self::MissingContent | Self::InvalidFilename | Self::InvalidMimetype => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::NoSuchBucket | Self::NoSuchKey => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SlowDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::StoreUnavailable => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Service {
        code: ErrorCode,
        message: String,
        request_id: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// Create a new service error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Service {
            code,
            message: message.into(),
            request_id: current_request_id(),
        }
    }

    /// Reject a request whose form could not be read
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRequest, message)
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Service { code, .. } => *code,
            Self::Core(e) => match e {
                CoreError::Validation(v) => match v {
                    fnstack_core::ValidationError::MissingContent(_) => ErrorCode::MissingContent,
                    fnstack_core::ValidationError::InvalidFilename(_) => ErrorCode::InvalidFilename,
                    fnstack_core::ValidationError::InvalidMimetype(_) => ErrorCode::InvalidMimetype,
                },
                CoreError::Store(s) => match s {
                    StoreError::NoSuchBucket(_) => ErrorCode::NoSuchBucket,
                    StoreError::NoSuchKey { .. } => ErrorCode::NoSuchKey,
                    StoreError::Throttled(_) => ErrorCode::SlowDown,
                    StoreError::Timeout(_) => ErrorCode::UpstreamTimeout,
                    StoreError::Connection(_) | StoreError::Upstream { .. } => {
                        ErrorCode::StoreUnavailable
                    }
                    _ => ErrorCode::InternalError,
                },
                CoreError::Io(_) => ErrorCode::InternalError,
            },
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    request_id: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();
        let request_id = match &self {
            ApiError::Service { request_id, .. } => request_id.clone(),
            ApiError::Core(_) => current_request_id(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code = code.as_str(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = code.as_str(), "Request rejected");
        }

        let body = ErrorBody {
            code: code.as_str(),
            message: self.to_string(),
            request_id: &request_id,
        };

        (
            status,
            [(REQUEST_ID_HEADER, request_id.as_str())],
            Json(body),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnstack_core::ValidationError;
    use rstest::rstest;

    #[rstest]
    #[case(
        ValidationError::MissingContent("empty".into()).into(),
        StatusCode::UNPROCESSABLE_ENTITY
    )]
    #[case(ValidationError::InvalidFilename("..".into()).into(), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(
        StoreError::NoSuchKey { bucket: "b".into(), key: "k".into() }.into(),
        StatusCode::NOT_FOUND
    )]
    #[case(StoreError::Throttled("slow".into()).into(), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(StoreError::Timeout("late".into()).into(), StatusCode::GATEWAY_TIMEOUT)]
    #[case(
        StoreError::Upstream { status: 500, message: "boom".into() }.into(),
        StatusCode::BAD_GATEWAY
    )]
    fn test_core_error_status(#[case] err: CoreError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(err).error_code().status_code(), status);
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::malformed("expected multipart/form-data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let header_id = response.headers()["x-request-id"].to_str().unwrap().to_string();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "MalformedRequest");
        assert_eq!(json["message"], "expected multipart/form-data");
        assert_eq!(json["requestId"], header_id);
    }
}
