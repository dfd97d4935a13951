//! Object-store gateway for the file service

use crate::{
    error::{CoreError, Result, ValidationError},
    metadata::{FileMetadata, ObjectRecord},
    validate::validate,
};
use fnstack_store::{ObjectStore, StoreError, StoredObject};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Confirmation of a stored upload
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Created {
    /// Key the content was stored under
    pub key: String,
    /// Number of bytes written
    pub size: u64,
}

/// Gateway performing file operations against one bucket.
///
/// The gateway keeps no state of its own beyond the store handle and the
/// bucket name, so it can be shared freely between concurrent requests.
pub struct ObjectStoreGateway<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    bucket: String,
}

impl<S: ObjectStore + ?Sized> Clone for ObjectStoreGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bucket: self.bucket.clone(),
        }
    }
}

impl<S: ObjectStore + ?Sized> ObjectStoreGateway<S> {
    /// Create a gateway over the given bucket
    pub fn new(store: Arc<S>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Bucket served by this gateway
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Make sure a bucket exists.
    ///
    /// Issues a create and treats "already exists" as success, so a
    /// concurrent creator never turns into an error.
    #[instrument(skip(self))]
    pub async fn ensure_bucket(&self, name: &str) -> Result<()> {
        match self.store.create_bucket(name).await {
            Ok(()) => {
                debug!(bucket = %name, "Created bucket");
                Ok(())
            }
            Err(StoreError::BucketAlreadyExists(_)) => {
                debug!(bucket = %name, "Bucket already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate and store an upload under its filename.
    ///
    /// An existing object with the same key is replaced.
    #[instrument(skip(self, metadata), fields(key = %metadata.filename))]
    pub async fn upload(&self, metadata: &FileMetadata) -> Result<Created> {
        validate(metadata)?;

        let Some(source) = &metadata.content else {
            return Err(ValidationError::MissingContent("no content supplied".to_string()).into());
        };
        let data = source.read().await?;
        let size = data.len() as u64;

        self.store
            .put_object(&self.bucket, &metadata.filename, data, &metadata.mimetype)
            .await?;

        debug!(size, "Stored object");
        Ok(Created {
            key: metadata.filename.clone(),
            size,
        })
    }

    /// Fetch an object and its content type
    #[instrument(skip(self))]
    pub async fn download(&self, key: &str) -> Result<StoredObject> {
        self.store
            .get_object(&self.bucket, key)
            .await
            .map_err(CoreError::from)
    }

    /// Names of every bucket in the store, sorted
    #[instrument(skip(self))]
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let mut names = self.store.list_buckets().await?;
        names.sort();
        Ok(names)
    }

    /// List every object in the bucket, sorted by key
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ObjectRecord>> {
        let mut records: Vec<ObjectRecord> = self
            .store
            .list_objects(&self.bucket)
            .await?
            .into_iter()
            .map(ObjectRecord::from)
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}
