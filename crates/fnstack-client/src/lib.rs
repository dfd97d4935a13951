//! # fnstack Client SDK
//!
//! A typed client for the fnstack file service.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fnstack_client::{Config, FileServiceClient, FileUpload};
//!
//! #[tokio::main]
//! async fn main() -> fnstack_client::Result<()> {
//!     let client = FileServiceClient::new(Config::new("http://localhost:8080"))?;
//!
//!     client.ensure_bucket("my-bucket-8701").await?;
//!     client
//!         .upload_file(FileUpload::from_bytes("hello", "README.md", "text/plain"))
//!         .await?;
//!
//!     for entry in client.list_files().await? {
//!         println!("{} ({} bytes)", entry.key, entry.size);
//!     }
//!
//!     let file = client.download_file("README.md").await?;
//!     println!("Content: {}", String::from_utf8_lossy(&file.data));
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::FileServiceClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use types::*;
