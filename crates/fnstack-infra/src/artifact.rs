//! Deployment artifact lookup

use crate::error::{InfraError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Context key naming the packaged function artifact
pub const ARTIFACT_CONTEXT_KEY: &str = "zip";

/// Opaque reference to a packaged function artifact
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn location(&self) -> &str {
        &self.0
    }
}

/// Supplies the artifact a function node deploys
pub trait ArtifactSource {
    fn artifact(&self) -> Result<ArtifactRef>;
}

impl ArtifactSource for ArtifactRef {
    fn artifact(&self) -> Result<ArtifactRef> {
        Ok(self.clone())
    }
}

/// Key/value context handed to a deployment, as given by `-c key=value`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployContext {
    values: BTreeMap<String, String>,
}

impl DeployContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` pairs; later pairs replace earlier ones
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    context.insert(key.trim(), value);
                }
                _ => {
                    return Err(InfraError::InvalidContext(format!(
                        "expected key=value, got {pair:?}"
                    )))
                }
            }
        }
        Ok(context)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl ArtifactSource for DeployContext {
    fn artifact(&self) -> Result<ArtifactRef> {
        match self.get(ARTIFACT_CONTEXT_KEY) {
            Some(location) if !location.is_empty() => Ok(ArtifactRef::new(location)),
            _ => Err(InfraError::MissingContext(format!(
                "context key {ARTIFACT_CONTEXT_KEY:?} must name the function artifact"
            ))),
        }
    }
}
