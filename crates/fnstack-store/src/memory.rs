//! In-memory object store for testing and local development

use crate::{ObjectStore, ObjectSummary, Result, StoreError, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// An in-memory object store
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    buckets: Arc<DashMap<String, DashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
        }
    }

}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        match self.buckets.entry(bucket.to_string()) {
            Entry::Occupied(_) => Err(StoreError::BucketAlreadyExists(bucket.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(DashMap::new());
                Ok(())
            }
        }
    }

    async fn list_buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NoSuchKey {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects
            .iter()
            .map(|entry| ObjectSummary {
                key: entry.key().clone(),
                size: entry.value().data.len() as u64,
            })
            .collect())
    }
}
