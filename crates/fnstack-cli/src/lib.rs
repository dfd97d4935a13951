//! # fnstack Gateway
//!
//! HTTP file service over a single object-store bucket.
//!
//! This crate provides:
//! - **File API**: Multipart upload, download, sorted listing and bucket creation
//! - **Service endpoints**: Health check and server time
//! - **Synthesis CLI**: `fnstack-synth` renders the deployment template
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │          (fnstack-client, curl, browsers)           │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  fnstack Gateway                     │
//! ├─────────────────────────────────────────────────────┤
//! │      Request ID │ Logging │ CORS │ Body limit       │
//! ├─────────────────────────────────────────────────────┤
//! │                 File handlers                        │
//! │       (upload, download, list, bucket, time)        │
//! ├─────────────────────────────────────────────────────┤
//! │                   fnstack-core                       │
//! │       (MetadataValidator, ObjectStoreGateway)       │
//! ├─────────────────────────────────────────────────────┤
//! │                  fnstack-store                       │
//! │            (in-memory, S3-compatible)               │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::create_router;
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
