//! Deployment configuration resolution
//!
//! Sources are layered lowest first: built-in defaults, an optional
//! JSON configuration file, an optional raw JSON document, then environment
//! variables such as `FNSTACK_COMPUTE__MEMORY_MB=512`.
//!
//! The layering lowercases every key. Tag keys are restored to the
//! spelling used in the file or JSON document afterwards.

use crate::error::Result;
use crate::graph::RemovalPolicy;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "FNSTACK";

/// Compute function settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// Entry point inside the deployment artifact
    pub handler: String,
    /// Runtime identifier
    pub runtime: String,
    /// Memory size in megabytes
    pub memory_mb: u32,
    /// Invocation timeout in seconds
    pub timeout_sec: u32,
    /// Deployed function name
    pub function_name: String,
    /// Node id of the function
    pub id: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            handler: "bootstrap".to_string(),
            runtime: "provided.al2023".to_string(),
            memory_mb: 256,
            timeout_sec: 60,
            function_name: "FileServiceLambda".to_string(),
            id: "file-service-lambda".to_string(),
        }
    }
}

/// Storage bucket settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Node id of the bucket
    pub bucket_id: String,
    /// Physical bucket name
    pub bucket_name: String,
    /// Fate of the bucket on stack deletion; provider default when unset
    #[serde(default)]
    pub removal_policy: Option<RemovalPolicy>,
    /// Empty the bucket on deletion. Requires [`RemovalPolicy::Destroy`].
    #[serde(default)]
    pub auto_delete_objects: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_id: "my-bucket-8701-id".to_string(),
            bucket_name: "my-bucket-8701".to_string(),
            removal_policy: None,
            auto_delete_objects: false,
        }
    }
}

/// HTTP routing layer settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpApiConfig {
    /// Whether a route is placed in front of the function
    pub enabled: bool,
    /// Node id of the route
    pub id: String,
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            id: "HttpApiGatewayIntegration".to_string(),
        }
    }
}

/// Fully resolved deployment configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub compute: ComputeConfig,
    pub storage: StorageConfig,
    pub http_api: HttpApiConfig,
    /// Outer scope id
    pub stack_id: String,
    /// Inner scope id holding the resources
    pub construct_id: String,
    /// Tags applied to every resource in the template
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            compute: ComputeConfig::default(),
            storage: StorageConfig::default(),
            http_api: HttpApiConfig::default(),
            stack_id: "FileServiceStack".to_string(),
            construct_id: "LambdaWithBucketConstructId".to_string(),
            tags: BTreeMap::new(),
        }
    }
}

/// Builds a [`ResourceConfig`] from layered sources
#[derive(Clone, Debug)]
pub struct ConfigResolver {
    file: Option<PathBuf>,
    raw: Option<String>,
    env_prefix: Option<String>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self {
            file: None,
            raw: None,
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }
}

impl ConfigResolver {
    /// Create a resolver reading defaults and `FNSTACK_*` variables
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a JSON configuration file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Layer a raw JSON document
    pub fn with_json(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Read environment variables with a different prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignore the environment
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Merge every source over the defaults.
    ///
    /// Absent keys take their default. A value that cannot be coerced to
    /// the expected type yields [`InfraError::ConfigType`](crate::InfraError::ConfigType).
    pub fn resolve(&self) -> Result<ResourceConfig> {
        let ResourceConfig {
            compute,
            storage,
            http_api,
            stack_id,
            construct_id,
            ..
        } = ResourceConfig::default();

        let mut builder = Config::builder()
            .set_default("compute.handler", compute.handler)?
            .set_default("compute.runtime", compute.runtime)?
            .set_default("compute.memory_mb", i64::from(compute.memory_mb))?
            .set_default("compute.timeout_sec", i64::from(compute.timeout_sec))?
            .set_default("compute.function_name", compute.function_name)?
            .set_default("compute.id", compute.id)?
            .set_default("storage.bucket_id", storage.bucket_id)?
            .set_default("storage.bucket_name", storage.bucket_name)?
            .set_default("storage.auto_delete_objects", storage.auto_delete_objects)?
            .set_default("http_api.enabled", http_api.enabled)?
            .set_default("http_api.id", http_api.id)?
            .set_default("stack_id", stack_id)?
            .set_default("construct_id", construct_id)?;

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Json));
        }

        if let Some(raw) = &self.raw {
            builder = builder.add_source(File::from_str(raw, FileFormat::Json));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let mut resolved: ResourceConfig = builder.build()?.try_deserialize()?;
        let spellings = self.tag_spellings()?;
        resolved.tags = resolved
            .tags
            .into_iter()
            .map(|(key, value)| (spellings.get(&key).cloned().unwrap_or(key), value))
            .collect();

        debug!(
            stack_id = %resolved.stack_id,
            function = %resolved.compute.function_name,
            "Resolved configuration"
        );
        Ok(resolved)
    }

    /// Lowercased tag key to the spelling found in the JSON sources
    fn tag_spellings(&self) -> Result<HashMap<String, String>> {
        let mut documents = Vec::new();
        if let Some(path) = &self.file {
            documents.push(std::fs::read_to_string(path)?);
        }
        if let Some(raw) = &self.raw {
            documents.push(raw.clone());
        }

        let mut spellings = HashMap::new();
        for text in &documents {
            let document: serde_json::Value = serde_json::from_str(text)?;
            if let Some(tags) = document.get("tags").and_then(serde_json::Value::as_object) {
                for key in tags.keys() {
                    spellings.insert(key.to_lowercase(), key.clone());
                }
            }
        }
        Ok(spellings)
    }
}

/// Resolve a raw JSON document against the defaults, ignoring the environment
pub fn resolve(raw: &serde_json::Value) -> Result<ResourceConfig> {
    ConfigResolver::new()
        .without_env()
        .with_json(raw.to_string())
        .resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InfraError;
    use rstest::rstest;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_empty_input_yields_defaults() {
        let config = resolve(&json!({})).unwrap();

        assert_eq!(config.compute.memory_mb, 256);
        assert_eq!(config.compute.timeout_sec, 60);
        assert_eq!(config.compute.handler, "bootstrap");
        assert_eq!(config.compute.function_name, "FileServiceLambda");
        assert_eq!(config.compute.id, "file-service-lambda");
        assert_eq!(config.storage.bucket_id, "my-bucket-8701-id");
        assert_eq!(config.storage.bucket_name, "my-bucket-8701");
        assert_eq!(config.stack_id, "FileServiceStack");
        assert_eq!(config.construct_id, "LambdaWithBucketConstructId");
        assert!(config.http_api.enabled);
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_defaults_match_default_impl() {
        assert_eq!(resolve(&json!({})).unwrap(), ResourceConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_siblings() {
        let config = resolve(&json!({
            "compute": { "memory_mb": 512 },
            "storage": { "bucket_name": "uploads" }
        }))
        .unwrap();

        assert_eq!(config.compute.memory_mb, 512);
        assert_eq!(config.compute.timeout_sec, 60);
        assert_eq!(config.storage.bucket_name, "uploads");
        assert_eq!(config.storage.bucket_id, "my-bucket-8701-id");
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let config = resolve(&json!({ "compute": { "timeout_sec": "90" } })).unwrap();
        assert_eq!(config.compute.timeout_sec, 90);
    }

    #[test]
    fn test_tags_are_read() {
        let config = resolve(&json!({ "tags": { "project": "files" } })).unwrap();
        assert_eq!(config.tags.get("project").map(String::as_str), Some("files"));
    }

    #[test]
    fn test_tag_keys_keep_their_case() {
        let config =
            resolve(&json!({ "tags": { "Project": "Files", "CostCenter": "42" } })).unwrap();

        let keys: Vec<_> = config.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["CostCenter", "Project"]);
        assert_eq!(config.tags["Project"], "Files");
    }

    #[test]
    fn test_tag_keys_from_file_keep_their_case() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"tags": {{"Owner": "Platform", "env": "dev"}}}}"#).unwrap();

        let config = ConfigResolver::new()
            .without_env()
            .with_file(file.path())
            .with_json(r#"{"tags": {"Env": "prod"}}"#)
            .resolve()
            .unwrap();

        assert_eq!(config.tags.get("Owner").map(String::as_str), Some("Platform"));
        assert_eq!(config.tags.get("Env").map(String::as_str), Some("prod"));
        assert_eq!(config.tags.len(), 2);
    }

    #[test]
    fn test_removal_policy_is_opt_in() {
        let config = resolve(&json!({})).unwrap();
        assert_eq!(config.storage.removal_policy, None);
        assert!(!config.storage.auto_delete_objects);

        let config = resolve(&json!({
            "storage": { "removal_policy": "DESTROY", "auto_delete_objects": true }
        }))
        .unwrap();
        assert_eq!(config.storage.removal_policy, Some(RemovalPolicy::Destroy));
        assert!(config.storage.auto_delete_objects);
    }

    #[rstest]
    #[case(json!({ "storage": { "removal_policy": "SOMETIMES" } }))]
    #[case(json!({ "compute": { "timeout_sec": "soon" } }))]
    #[case(json!({ "compute": { "memory_mb": "lots" } }))]
    #[case(json!({ "http_api": { "enabled": "perhaps" } }))]
    #[case(json!({ "compute": 5 }))]
    fn test_wrong_type_is_config_type_error(#[case] raw: serde_json::Value) {
        let err = resolve(&raw).unwrap_err();
        assert!(matches!(err, InfraError::ConfigType(_)), "got {err:?}");
    }

    #[test]
    fn test_malformed_json_is_source_error() {
        let err = ConfigResolver::new()
            .without_env()
            .with_json("{ not json")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, InfraError::ConfigSource(_)));
    }

    #[test]
    fn test_file_then_json_layering() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"compute": {{"memory_mb": 1024, "timeout_sec": 30}}, "stack_id": "FromFile"}}"#
        )
        .unwrap();

        let config = ConfigResolver::new()
            .without_env()
            .with_file(file.path())
            .with_json(r#"{"compute": {"timeout_sec": 15}}"#)
            .resolve()
            .unwrap();

        assert_eq!(config.compute.memory_mb, 1024);
        assert_eq!(config.compute.timeout_sec, 15);
        assert_eq!(config.stack_id, "FromFile");
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = ConfigResolver::new()
            .without_env()
            .with_file("/no/such/fnstack.json")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, InfraError::ConfigSource(_)));
    }

    #[test]
    fn test_environment_overrides_json() {
        std::env::set_var("FNSTACKENVTEST_COMPUTE__MEMORY_MB", "2048");
        std::env::set_var("FNSTACKENVTEST_HTTP_API__ENABLED", "false");

        let config = ConfigResolver::new()
            .with_env_prefix("FNSTACKENVTEST")
            .with_json(r#"{"compute": {"memory_mb": 512}}"#)
            .resolve()
            .unwrap();

        assert_eq!(config.compute.memory_mb, 2048);
        assert!(!config.http_api.enabled);

        std::env::remove_var("FNSTACKENVTEST_COMPUTE__MEMORY_MB");
        std::env::remove_var("FNSTACKENVTEST_HTTP_API__ENABLED");
    }
}
