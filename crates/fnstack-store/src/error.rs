//! Error types for the fnstack-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during object storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Bucket not found
    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    /// Object not found
    #[error("object not found: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },

    /// Bucket already exists
    #[error("bucket already exists: {0}")]
    BucketAlreadyExists(String),

    /// Request timed out upstream or in the client
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Upstream asked us to slow down
    #[error("request throttled: {0}")]
    Throttled(String),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Unexpected upstream response
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Response body could not be decoded
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Check if this is a "not found" error (bucket or key)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchBucket(_) | Self::NoSuchKey { .. })
    }

    /// Check if the failure is transient and a caller may retry
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Throttled(_) | Self::Connection(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(err.to_string())
        } else if err.is_connect() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Upstream {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

impl From<quick_xml::de::DeError> for StoreError {
    fn from(err: quick_xml::de::DeError) -> Self {
        StoreError::Deserialization(err.to_string())
    }
}
