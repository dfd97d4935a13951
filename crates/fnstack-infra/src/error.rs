//! Error types for the fnstack-infra crate

use crate::graph::NodeKind;
use thiserror::Error;

/// Result type alias using `InfraError`
pub type Result<T> = std::result::Result<T, InfraError>;

/// Errors raised while resolving configuration or building a stack
#[derive(Error, Debug)]
pub enum InfraError {
    /// A supplied configuration value has the wrong type
    #[error("configuration type error: {0}")]
    ConfigType(String),

    /// A configuration source could not be read or parsed
    #[error("configuration source error: {0}")]
    ConfigSource(String),

    /// Two nodes or outputs share an id within one scope
    #[error("duplicate id {id:?} in scope {scope}")]
    DuplicateId { scope: String, id: String },

    /// A node or output refers to a node that is not visible from its scope
    #[error("{from} in scope {scope} references missing node {target}")]
    DanglingReference {
        scope: String,
        from: String,
        target: String,
    },

    /// A node is bound to a parent of the wrong kind, or lacks a required one
    #[error("{kind} {id:?} in scope {scope} expects parent {expected}, found {found}")]
    InvalidParent {
        scope: String,
        id: String,
        kind: NodeKind,
        expected: String,
        found: String,
    },

    /// Configuration values are individually valid but contradict each other
    #[error("conflicting configuration: {0}")]
    ConflictingConfig(String),

    /// Required deployment context is absent
    #[error("missing deployment context: {0}")]
    MissingContext(String),

    /// Deployment context entry is malformed
    #[error("invalid deployment context: {0}")]
    InvalidContext(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for InfraError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            // Deserialization failures surface as either variant
            config::ConfigError::Type { .. } | config::ConfigError::Message(_) => {
                InfraError::ConfigType(err.to_string())
            }
            other => InfraError::ConfigSource(other.to_string()),
        }
    }
}
