//! # fnstack Core
//!
//! Runtime file service for fnstack.
//!
//! This crate provides:
//! - **File metadata**: Upload requests and listing records
//! - **Validation**: Pure checks on upload requests before any store call
//! - **Gateway**: Bucket and object operations against an object store
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           HTTP file service             │
//! ├─────────────────────────────────────────┤
//! │   MetadataValidator │ ObjectStoreGateway│
//! ├─────────────────────────────────────────┤
//! │             ObjectStore                 │
//! └─────────────────────────────────────────┘
//! ```

pub mod error;
pub mod gateway;
pub mod metadata;
pub mod validate;

pub use error::{CoreError, Result, ValidationError};
pub use gateway::{Created, ObjectStoreGateway};
pub use metadata::{ContentSource, FileMetadata, ObjectRecord};
pub use validate::validate;

pub use fnstack_store::StoredObject;
