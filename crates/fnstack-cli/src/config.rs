//! Gateway configuration

use serde::{Deserialize, Serialize};

/// File service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Bucket the file routes operate on
    pub bucket_name: String,
    /// S3-compatible object store URL; in-memory storage when unset
    pub store_url: Option<String>,
    /// Object store request timeout (seconds)
    pub store_timeout_secs: u64,
    /// Create the bucket before accepting requests
    pub ensure_bucket_on_start: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            bucket_name: "my-bucket-8701".to_string(),
            store_url: None,
            store_timeout_secs: 30,
            ensure_bucket_on_start: false,
            max_body_size: 64 * 1024 * 1024, // 64 MB
            cors_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
