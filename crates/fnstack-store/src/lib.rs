//! # fnstack Store
//!
//! Object storage layer for fnstack.
//!
//! This crate provides:
//! - **Bucket operations**: Create buckets and list the ones that exist
//! - **Object operations**: Put, get and list objects addressed by string key
//! - **Backends**: An in-memory store and an S3-compatible HTTP store
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Object Store Gateway         │
//! ├─────────────────────────────────────────┤
//! │           ObjectStore Trait             │
//! ├────────────────────┬────────────────────┤
//! │  HttpObjectStore   │ MemoryObjectStore  │
//! ├────────────────────┴────────────────────┤
//! │       S3-compatible object storage      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use fnstack_store::{MemoryObjectStore, ObjectStore};
//!
//! let store = MemoryObjectStore::new();
//! store.create_bucket("files").await?;
//! store.put_object("files", "hello.txt", data, "text/plain").await?;
//! let object = store.get_object("files", "hello.txt").await?;
//! ```

pub mod error;
pub mod http;
pub mod memory;

pub use error::{Result, StoreError};
pub use http::{HttpObjectStore, HttpStoreConfig};
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content type recorded when the writer supplied none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object as returned by a read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Object content
    pub data: Bytes,
    /// Content type recorded at write time
    pub content_type: String,
}

/// One entry of a bucket listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
}

/// Trait for object storage backends
///
/// Every call is a single request/response exchange with the backend.
/// Implementations never retry.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a bucket. Fails with [`StoreError::BucketAlreadyExists`] when
    /// the bucket is already there.
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Names of every bucket the backend holds, in no particular order
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// Store an object, replacing any object under the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()>;

    /// Retrieve an object
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject>;

    /// List every object in a bucket, in no particular order
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>>;
}
