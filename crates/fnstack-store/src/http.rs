//! S3-compatible HTTP object store client
//!
//! Talks path-style REST (`/{bucket}` and `/{bucket}/{key}`) to any
//! S3-compatible endpoint. Requests are sent unsigned: credential
//! acquisition belongs to whatever sits in front of the endpoint.

use crate::{ObjectStore, ObjectSummary, Result, StoreError, StoredObject, DEFAULT_CONTENT_TYPE};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for the HTTP object store
#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    /// Endpoint URL (e.g., "http://localhost:9000")
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpStoreConfig {
    /// Create with a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Object store client for S3-compatible endpoints
#[derive(Clone)]
pub struct HttpObjectStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpObjectStore {
    /// Create a new HTTP object store
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(StoreError::Configuration("endpoint must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from URL string
    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(HttpStoreConfig::with_endpoint(url))
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            urlencoding::encode(bucket)
        )
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.bucket_url(bucket), encoded_key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self))]
    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let response = self.client.put(self.bucket_url(bucket)).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(response, bucket, None).await)
    }

    #[instrument(skip(self))]
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let url = format!("{}/", self.config.endpoint.trim_end_matches('/'));
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "", None).await);
        }

        let text = response.text().await?;
        let result: ListAllMyBucketsResult = quick_xml::de::from_str(&text)?;
        Ok(result.buckets.bucket.into_iter().map(|b| b.name).collect())
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        let response = self
            .client
            .put(self.object_url(bucket, key))
            .header(header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(response, bucket, Some(key)).await)
    }

    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let response = self.client.get(self.object_url(bucket, key)).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, bucket, Some(key)).await);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = response.bytes().await?;

        Ok(StoredObject { data, content_type })
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
        let url = self.bucket_url(bucket);
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("list-type", "2")]);
            if let Some(token) = &continuation {
                request = request.query(&[("continuation-token", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(error_from_response(response, bucket, None).await);
            }

            let text = response.text().await?;
            let page: ListBucketResult = quick_xml::de::from_str(&text)?;
            debug!(bucket = %bucket, count = page.contents.len(), "Fetched listing page");

            objects.extend(page.contents.into_iter().map(|c| ObjectSummary {
                key: c.key,
                size: c.size,
            }));

            match (page.is_truncated, page.next_continuation_token) {
                (true, Some(token)) => continuation = Some(token),
                (true, None) => {
                    return Err(StoreError::Deserialization(
                        "truncated listing without a continuation token".to_string(),
                    ))
                }
                (false, _) => break,
            }
        }

        Ok(objects)
    }
}

// ==================== Response Parsing ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    contents: Vec<ListedContent>,
    #[serde(default)]
    is_truncated: bool,
    next_continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedContent {
    key: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListAllMyBucketsResult {
    #[serde(default)]
    buckets: BucketList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketList {
    #[serde(default)]
    bucket: Vec<ListedBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedBucket {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

async fn error_from_response(response: Response, bucket: &str, key: Option<&str>) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = quick_xml::de::from_str(&text).unwrap_or_default();
    classify_error(status, body, bucket, key)
}

fn classify_error(
    status: StatusCode,
    body: ErrorBody,
    bucket: &str,
    key: Option<&str>,
) -> StoreError {
    let message = if body.message.is_empty() {
        status.to_string()
    } else {
        body.message
    };

    match (status, body.code.as_str()) {
        (_, "NoSuchBucket") => StoreError::NoSuchBucket(bucket.to_string()),
        (_, "BucketAlreadyExists" | "BucketAlreadyOwnedByYou") => {
            StoreError::BucketAlreadyExists(bucket.to_string())
        }
        (_, "SlowDown") | (StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE, _) => {
            StoreError::Throttled(message)
        }
        (_, "RequestTimeout") | (StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT, _) => {
            StoreError::Timeout(message)
        }
        (StatusCode::NOT_FOUND, _) => match key {
            Some(key) => StoreError::NoSuchKey {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            None => StoreError::NoSuchBucket(bucket.to_string()),
        },
        _ => StoreError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}
