//! Common types for the client SDK

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content of an upload
#[derive(Clone, Debug)]
pub enum UploadContent {
    /// In-memory bytes
    Bytes(Bytes),
    /// File read when the upload is sent
    Path(PathBuf),
}

/// A file to upload
#[derive(Clone, Debug)]
pub struct FileUpload {
    /// Content to send
    pub content: UploadContent,
    /// Object key to store under
    pub filename: String,
    /// Declared content type
    pub mimetype: String,
}

impl FileUpload {
    /// Upload in-memory bytes
    pub fn from_bytes(
        data: impl Into<Bytes>,
        filename: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            content: UploadContent::Bytes(data.into()),
            filename: filename.into(),
            mimetype: mimetype.into(),
        }
    }

    /// Upload the contents of a local file
    pub fn from_path(
        path: impl Into<PathBuf>,
        filename: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            content: UploadContent::Path(path.into()),
            filename: filename.into(),
            mimetype: mimetype.into(),
        }
    }
}

/// Result of an upload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Key the content was stored under
    pub key: String,
    /// Bytes stored
    pub size: u64,
}

/// One entry of a file listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Object key
    #[serde(rename = "objectKey")]
    pub key: String,
    /// Size in bytes
    pub size: u64,
}

/// A downloaded file
#[derive(Clone, Debug)]
pub struct DownloadedFile {
    /// File content
    pub data: Bytes,
    /// Content type reported by the service
    pub content_type: Option<String>,
    /// Content-Disposition reported by the service
    pub content_disposition: Option<String>,
}
