//! # fnstack Infra
//!
//! Design-time model of the file-service deployment.
//!
//! This crate provides:
//! - **Configuration**: Layered resolution of compute, storage and routing settings
//! - **Resource graph**: Scoped nodes, dependency edges and named outputs
//! - **Stack builder**: Role, function, endpoint, bucket and optional route
//! - **Synthesis**: A serializable template handed to a provisioner
//!
//! ## Example
//!
//! ```no_run
//! use fnstack_infra::{build, synthesize, ConfigResolver, DeployContext, TemplateSynthesizer};
//!
//! # fn main() -> fnstack_infra::Result<()> {
//! let config = ConfigResolver::new().resolve()?;
//! let context = DeployContext::new().with("zip", "target/lambda/bootstrap.zip");
//! let stack = build(&config, &context)?;
//! synthesize(&stack, &TemplateSynthesizer::new("synth.out"))?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod graph;
pub mod stack;
pub mod synth;

pub use artifact::{ArtifactRef, ArtifactSource, DeployContext, ARTIFACT_CONTEXT_KEY};
pub use config::{resolve, ConfigResolver, ResourceConfig};
pub use error::{InfraError, Result};
pub use graph::{
    EndpointAuth, NodeKind, NodeRef, Output, RemovalPolicy, ResourceGraph, ResourceNode,
};
pub use stack::{build, Stack, FUNCTION_URL_OUTPUT, HTTP_API_URL_OUTPUT};
pub use synth::{synthesize, Provisioner, Template, TemplateSynthesizer};
