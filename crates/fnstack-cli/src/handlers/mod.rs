//! File service request handlers

pub mod bucket;
pub mod files;
pub mod service;

pub use bucket::*;
pub use files::*;
pub use service::*;
