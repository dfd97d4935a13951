//! Error types for the fnstack-core crate

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// An upload request rejected before it reached the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Content is absent, unreadable or empty
    #[error("missing content: {0}")]
    MissingContent(String),

    /// Filename is not a safe object key
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// Mimetype is not a `type/subtype` token
    #[error("invalid mimetype: {0}")]
    InvalidMimetype(String),
}

/// Errors that can occur in file service operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Upload request failed validation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Object store error
    #[error("object store error: {0}")]
    Store(#[from] fnstack_store::StoreError),

    /// Reading upload content failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Check if the requested bucket or object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }

    /// Check if the caller may resubmit after fixing its input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
