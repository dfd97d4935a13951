//! Main client implementation

use crate::{types::*, ClientError, Config, Result};
use chrono::NaiveDateTime;
use reqwest::{
    header,
    multipart::{Form, Part},
    Client, Response,
};
use tracing::{debug, instrument};

/// Format the service uses for `/time`
const TIME_FORMAT: &str = "%d %b %Y, %H:%M:%S";

/// File service client
pub struct FileServiceClient {
    config: Config,
    http: Client,
}

impl FileServiceClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config.user_agent.parse().map_err(|_| {
                ClientError::Config(format!("invalid user agent: {}", config.user_agent))
            })?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { config, http })
    }

    /// Create with endpoint URL
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::new(Config::new(endpoint))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== File Operations ====================

    /// Upload a file as a multipart form
    #[instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn upload_file(&self, upload: FileUpload) -> Result<UploadResult> {
        let data = match upload.content {
            UploadContent::Bytes(data) => data,
            UploadContent::Path(path) => tokio::fs::read(&path).await?.into(),
        };

        let form = Form::new()
            .part(
                "file",
                Part::bytes(data.to_vec()).file_name(upload.filename.clone()),
            )
            .text("filename", upload.filename)
            .text("mimetype", upload.mimetype);

        let response = self.request("POST", "/upload", Some(form)).await?;
        Ok(response.json().await?)
    }

    /// Download a file
    #[instrument(skip(self))]
    pub async fn download_file(&self, key: &str) -> Result<DownloadedFile> {
        let path = format!("/download/{}", encode_key(key));
        let response = self.request("GET", &path, None).await?;

        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_value(header::CONTENT_TYPE);
        let content_disposition = header_value(header::CONTENT_DISPOSITION);

        Ok(DownloadedFile {
            data: response.bytes().await?,
            content_type,
            content_disposition,
        })
    }

    /// List every file in the service's bucket, sorted by key
    #[instrument(skip(self))]
    pub async fn list_files(&self) -> Result<Vec<FileEntry>> {
        let response = self.request("GET", "/list", None).await?;
        Ok(response.json().await?)
    }

    // ==================== Bucket Operations ====================

    /// Create a bucket unless it already exists; returns the confirmation text
    #[instrument(skip(self))]
    pub async fn ensure_bucket(&self, name: &str) -> Result<String> {
        let path = format!("/bucket/{}", urlencoding::encode(name));
        let response = self.request("POST", &path, None).await?;
        Ok(response.text().await?)
    }

    /// Names of every bucket in the store, sorted
    #[instrument(skip(self))]
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let response = self.request("GET", "/buckets", None).await?;
        Ok(response.json().await?)
    }

    // ==================== Service Operations ====================

    /// Current server time
    #[instrument(skip(self))]
    pub async fn current_time(&self) -> Result<NaiveDateTime> {
        let response = self.request("GET", "/time", None).await?;
        let text = response.text().await?;
        NaiveDateTime::parse_from_str(text.trim(), TIME_FORMAT)
            .map_err(|e| ClientError::InvalidResponse(format!("unexpected time {text:?}: {e}")))
    }

    /// Check that the service answers
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool> {
        match self.request("GET", "/health", None).await {
            Ok(_) => Ok(true),
            Err(ClientError::Service { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ==================== Internal Helpers ====================

    async fn request(&self, method: &str, path: &str, form: Option<Form>) -> Result<Response> {
        let url = format!("{}{}", self.config.base_url(), path);

        let mut req = match method {
            "GET" => self.http.get(&url),
            "POST" => self.http.post(&url),
            _ => return Err(ClientError::Config(format!("Unknown method: {}", method))),
        };

        if let Some(form) = form {
            req = req.multipart(form);
        }

        debug!("Sending {} request to {}", method, url);
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(&text, status.as_u16()));
        }

        Ok(response)
    }
}

/// Percent-encode each path segment of a key, keeping the separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("README.md"), "README.md");
        assert_eq!(encode_key("docs/guide v2.txt"), "docs/guide%20v2.txt");
        assert_eq!(encode_key("a+b/c&d"), "a%2Bb/c%26d");
    }

    #[test]
    fn test_time_format_parses_single_digit_day() {
        let parsed = NaiveDateTime::parse_from_str("7 Mar 2025, 14:05:09", TIME_FORMAT).unwrap();
        assert_eq!(parsed.to_string(), "2025-03-07 14:05:09");
    }
}
