//! Application state

use crate::config::GatewayConfig;
use fnstack_core::ObjectStoreGateway;
use fnstack_store::{HttpObjectStore, HttpStoreConfig, MemoryObjectStore, ObjectStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// File operations against the configured bucket
    pub gateway: ObjectStoreGateway<dyn ObjectStore>,
}

impl AppState {
    /// Create application state, connecting to the configured store
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = match &config.store_url {
            Some(url) => {
                let store = HttpObjectStore::new(HttpStoreConfig {
                    endpoint: url.clone(),
                    timeout: Duration::from_secs(config.store_timeout_secs),
                })?;
                info!(endpoint = %url, "Using S3-compatible object store");
                Arc::new(store)
            }
            None => {
                warn!("Storage mode: in-memory (NOT persistent - for development only)");
                Arc::new(MemoryObjectStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create application state over an existing store
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        let gateway = ObjectStoreGateway::new(store, config.bucket_name.clone());
        Self { config, gateway }
    }
}
