//! Assembles the file-service deployment from a resolved configuration

use crate::artifact::ArtifactSource;
use crate::config::ResourceConfig;
use crate::error::{InfraError, Result};
use crate::graph::{
    BucketProperties, EndpointAuth, EndpointProperties, FunctionProperties, NodeProperties,
    Output, RemovalPolicy, ResourceGraph, RoleProperties, RouteProperties, ScopeId,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Output exposing the function's public endpoint URL
pub const FUNCTION_URL_OUTPUT: &str = "FunctionURLOutput";
/// Output exposing the HTTP routing layer URL
pub const HTTP_API_URL_OUTPUT: &str = "HttpApiGatewayUrlOutput";

/// Principal that runs the function
pub const FUNCTION_PRINCIPAL: &str = "lambda.amazonaws.com";
/// Policy granting access to the storage service
pub const STORAGE_ACCESS_POLICY: &str = "AmazonS3FullAccess";
/// Policy granting access to the observability service
pub const OBSERVABILITY_ACCESS_POLICY: &str = "CloudWatchFullAccess";

const URL_ATTRIBUTE: &str = "Url";
const LAMBDA_INTEGRATION: &str = "LambdaIntegration";

/// A fully built deployment
#[derive(Clone, Debug)]
pub struct Stack {
    stack_id: String,
    graph: ResourceGraph,
    stack_scope: ScopeId,
    construct_scope: ScopeId,
    tags: BTreeMap<String, String>,
}

impl Stack {
    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn outputs(&self) -> &[Output] {
        self.graph.outputs()
    }

    pub fn stack_scope(&self) -> ScopeId {
        self.stack_scope
    }

    pub fn construct_scope(&self) -> ScopeId {
        self.construct_scope
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}

/// Build the deployment graph.
///
/// Nodes are added in the order role, function, endpoint, bucket, then the
/// optional route. Any error aborts the build; no partial stack escapes.
pub fn build(config: &ResourceConfig, artifacts: &dyn ArtifactSource) -> Result<Stack> {
    let storage = &config.storage;
    if storage.auto_delete_objects && storage.removal_policy != Some(RemovalPolicy::Destroy) {
        return Err(InfraError::ConflictingConfig(
            "storage.auto_delete_objects requires storage.removal_policy DESTROY".to_string(),
        ));
    }

    let code = artifacts.artifact()?;
    debug!(artifact = %code.location(), "Resolved function artifact");

    let compute = &config.compute;
    let mut graph = ResourceGraph::new();
    let stack_scope = graph.add_root_scope(&config.stack_id);
    let scope = graph.add_scope(stack_scope, &config.construct_id)?;

    let role = graph.add_node(
        scope,
        format!("{}-role", compute.id),
        None,
        NodeProperties::Role(RoleProperties {
            assumed_by: FUNCTION_PRINCIPAL.to_string(),
            managed_policies: vec![
                STORAGE_ACCESS_POLICY.to_string(),
                OBSERVABILITY_ACCESS_POLICY.to_string(),
            ],
        }),
    )?;

    let function = graph.add_node(
        scope,
        &compute.id,
        Some(&role),
        NodeProperties::Function(FunctionProperties {
            function_name: compute.function_name.clone(),
            handler: compute.handler.clone(),
            runtime: compute.runtime.clone(),
            memory_size: compute.memory_mb,
            timeout: compute.timeout_sec,
            code,
        }),
    )?;

    let endpoint = graph.add_node(
        scope,
        format!("{}-url", compute.id),
        Some(&function),
        NodeProperties::Endpoint(EndpointProperties {
            auth_type: EndpointAuth::None,
        }),
    )?;

    graph.add_node(
        scope,
        &storage.bucket_id,
        None,
        NodeProperties::Bucket(BucketProperties {
            bucket_name: storage.bucket_name.clone(),
            removal_policy: storage.removal_policy,
            auto_delete_objects: storage.auto_delete_objects,
        }),
    )?;

    let route = if config.http_api.enabled {
        Some(graph.add_node(
            scope,
            &config.http_api.id,
            Some(&function),
            NodeProperties::Route(RouteProperties {
                default_integration: LAMBDA_INTEGRATION.to_string(),
            }),
        )?)
    } else {
        None
    };

    graph.add_output(stack_scope, FUNCTION_URL_OUTPUT, &endpoint, URL_ATTRIBUTE)?;
    if let Some(route) = &route {
        graph.add_output(scope, HTTP_API_URL_OUTPUT, route, URL_ATTRIBUTE)?;
    }

    info!(
        stack_id = %config.stack_id,
        nodes = graph.nodes().len(),
        outputs = graph.outputs().len(),
        "Built stack"
    );

    Ok(Stack {
        stack_id: config.stack_id.clone(),
        graph,
        stack_scope,
        construct_scope: scope,
        tags: config.tags.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactRef, DeployContext};
    use crate::config::resolve;
    use crate::graph::NodeKind;
    use serde_json::json;

    fn artifact() -> ArtifactRef {
        ArtifactRef::new("target/lambda/bootstrap.zip")
    }

    fn build_from(raw: serde_json::Value) -> Result<Stack> {
        build(&resolve(&raw).unwrap(), &artifact())
    }

    fn kinds(stack: &Stack) -> Vec<NodeKind> {
        stack.graph().nodes().iter().map(|n| n.kind()).collect()
    }

    #[test_log::test]
    fn test_default_stack() {
        let stack = build_from(json!({})).unwrap();

        assert_eq!(stack.stack_id(), "FileServiceStack");
        assert_eq!(
            kinds(&stack),
            vec![
                NodeKind::Role,
                NodeKind::Function,
                NodeKind::Endpoint,
                NodeKind::Bucket,
                NodeKind::Route
            ]
        );

        let ids: Vec<_> = stack.graph().nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "file-service-lambda-role",
                "file-service-lambda",
                "file-service-lambda-url",
                "my-bucket-8701-id",
                "HttpApiGatewayIntegration"
            ]
        );
    }

    #[test_log::test]
    fn test_exactly_one_function_url_output() {
        let stack = build_from(json!({})).unwrap();

        let url_outputs: Vec<_> = stack
            .outputs()
            .iter()
            .filter(|o| o.key == FUNCTION_URL_OUTPUT)
            .collect();
        assert_eq!(url_outputs.len(), 1);
        assert_eq!(url_outputs[0].scope, stack.stack_scope());
        assert_eq!(
            stack.graph().render_output(url_outputs[0]),
            "${FileServiceStack/LambdaWithBucketConstructId/file-service-lambda-url.Url}"
        );
    }

    #[test_log::test]
    fn test_route_output_in_construct_scope() {
        let stack = build_from(json!({})).unwrap();

        let output = stack
            .graph()
            .output(stack.construct_scope(), HTTP_API_URL_OUTPUT)
            .unwrap();
        assert_eq!(output.scope, stack.construct_scope());
        assert_eq!(output.node.id, "HttpApiGatewayIntegration");
    }

    #[test_log::test]
    fn test_routing_disabled() {
        let stack = build_from(json!({ "http_api": { "enabled": false } })).unwrap();

        assert!(!kinds(&stack).contains(&NodeKind::Route));
        let keys: Vec<_> = stack.outputs().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec![FUNCTION_URL_OUTPUT]);
    }

    #[test_log::test]
    fn test_function_properties() {
        let stack =
            build_from(json!({ "compute": { "memory_mb": 512, "timeout_sec": 30 } })).unwrap();
        let function = &stack.graph().nodes()[1];

        assert_eq!(
            function.parent.as_ref().map(|p| p.id.as_str()),
            Some("file-service-lambda-role")
        );
        match &function.properties {
            NodeProperties::Function(props) => {
                assert_eq!(props.memory_size, 512);
                assert_eq!(props.timeout, 30);
                assert_eq!(props.handler, "bootstrap");
                assert_eq!(props.function_name, "FileServiceLambda");
                assert_eq!(props.code, artifact());
            }
            other => panic!("expected function properties, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_role_grants_storage_and_observability() {
        let stack = build_from(json!({})).unwrap();
        match &stack.graph().nodes()[0].properties {
            NodeProperties::Role(props) => {
                assert_eq!(props.assumed_by, FUNCTION_PRINCIPAL);
                assert!(props.managed_policies.contains(&STORAGE_ACCESS_POLICY.to_string()));
                assert!(props
                    .managed_policies
                    .contains(&OBSERVABILITY_ACCESS_POLICY.to_string()));
            }
            other => panic!("expected role properties, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_endpoint_is_unauthenticated() {
        let stack = build_from(json!({})).unwrap();
        assert_eq!(
            stack.graph().nodes()[2].properties,
            NodeProperties::Endpoint(EndpointProperties {
                auth_type: EndpointAuth::None
            })
        );
    }

    #[test_log::test]
    fn test_duplicate_route_and_function_id() {
        let err =
            build_from(json!({ "http_api": { "id": "file-service-lambda" } })).unwrap_err();
        assert!(matches!(
            err,
            InfraError::DuplicateId { ref id, .. } if id == "file-service-lambda"
        ));
    }

    #[test_log::test]
    fn test_bucket_id_colliding_with_output_key() {
        let err =
            build_from(json!({ "storage": { "bucket_id": HTTP_API_URL_OUTPUT } })).unwrap_err();
        assert!(matches!(err, InfraError::DuplicateId { .. }));
    }

    #[test_log::test]
    fn test_construct_id_colliding_with_output_key() {
        let err = build_from(json!({ "construct_id": FUNCTION_URL_OUTPUT })).unwrap_err();
        assert!(matches!(err, InfraError::DuplicateId { .. }));
    }

    #[test_log::test]
    fn test_missing_artifact_context() {
        let config = resolve(&json!({})).unwrap();
        let err = build(&config, &DeployContext::new()).unwrap_err();
        assert!(matches!(err, InfraError::MissingContext(_)));
    }

    #[test_log::test]
    fn test_bucket_lifecycle_carried_through() {
        let stack = build_from(json!({
            "storage": { "removal_policy": "DESTROY", "auto_delete_objects": true }
        }))
        .unwrap();

        match &stack.graph().nodes()[3].properties {
            NodeProperties::Bucket(props) => {
                assert_eq!(props.removal_policy, Some(RemovalPolicy::Destroy));
                assert!(props.auto_delete_objects);
            }
            other => panic!("expected bucket properties, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_bucket_lifecycle_defaults_to_provider() {
        let stack = build_from(json!({})).unwrap();
        match &stack.graph().nodes()[3].properties {
            NodeProperties::Bucket(props) => {
                assert_eq!(props.removal_policy, None);
                assert!(!props.auto_delete_objects);
            }
            other => panic!("expected bucket properties, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_auto_delete_requires_destroy_policy() {
        for storage in [
            json!({ "auto_delete_objects": true }),
            json!({ "auto_delete_objects": true, "removal_policy": "RETAIN" }),
        ] {
            let err = build_from(json!({ "storage": storage })).unwrap_err();
            assert!(matches!(err, InfraError::ConflictingConfig(_)), "got {err:?}");
        }
    }

    #[test_log::test]
    fn test_tags_carried_through() {
        let stack = build_from(json!({ "tags": { "environment": "dev" } })).unwrap();
        assert_eq!(stack.tags().get("environment").map(String::as_str), Some("dev"));
    }
}
