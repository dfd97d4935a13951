//! Upload request and listing record types

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the bytes of an upload come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// Content already held in memory
    Bytes(Bytes),
    /// Content read from a file at upload time
    File(PathBuf),
}

impl ContentSource {
    /// Size of the content in bytes.
    ///
    /// Fails when a file source does not exist, is not a regular file or
    /// cannot be inspected.
    pub fn size(&self) -> std::io::Result<u64> {
        match self {
            Self::Bytes(data) => Ok(data.len() as u64),
            Self::File(path) => {
                let meta = std::fs::metadata(path)?;
                if !meta.is_file() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("{} is not a regular file", path.display()),
                    ));
                }
                Ok(meta.len())
            }
        }
    }

    /// Load the full content
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match self {
            Self::Bytes(data) => Ok(data.clone()),
            Self::File(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

impl From<Bytes> for ContentSource {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(data))
    }
}

impl From<&'static str> for ContentSource {
    fn from(data: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(data.as_bytes()))
    }
}

impl From<PathBuf> for ContentSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// A single upload request
#[derive(Clone, Debug)]
pub struct FileMetadata {
    /// Content to store; `None` when the request carried no content at all
    pub content: Option<ContentSource>,
    /// Object key the content is stored under
    pub filename: String,
    /// Declared content type
    pub mimetype: String,
}

impl FileMetadata {
    /// Create an upload request
    pub fn new(
        content: impl Into<ContentSource>,
        filename: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            content: Some(content.into()),
            filename: filename.into(),
            mimetype: mimetype.into(),
        }
    }

    /// Create an upload request that carries no content
    pub fn without_content(filename: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            content: None,
            filename: filename.into(),
            mimetype: mimetype.into(),
        }
    }
}

/// One object of a bucket listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object key
    #[serde(rename = "objectKey")]
    pub key: String,
    /// Size in bytes
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl From<fnstack_store::ObjectSummary> for ObjectRecord {
    fn from(summary: fnstack_store::ObjectSummary) -> Self {
        Self {
            key: summary.key,
            size_bytes: summary.size,
        }
    }
}
