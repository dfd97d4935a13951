//! Scoped resource graph
//!
//! Scopes form a tree (stack, then construct). Node ids and output keys
//! share one namespace per scope. A node may only reference a node that
//! lives in its own scope or in an ancestor scope, and only of the kind
//! its own kind binds to (see [`NodeKind::parent_kind`]).

use crate::artifact::ArtifactRef;
use crate::error::{InfraError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Handle to a scope within one graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Clone, Debug)]
struct Scope {
    name: String,
    parent: Option<ScopeId>,
}

/// Kind of a resource node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Role,
    Function,
    Endpoint,
    Bucket,
    Route,
}

impl NodeKind {
    /// Kind of node this kind must be bound to, if any
    pub fn parent_kind(self) -> Option<NodeKind> {
        match self {
            NodeKind::Function => Some(NodeKind::Role),
            NodeKind::Endpoint | NodeKind::Route => Some(NodeKind::Function),
            NodeKind::Role | NodeKind::Bucket => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Role => "Role",
            NodeKind::Function => "Function",
            NodeKind::Endpoint => "Endpoint",
            NodeKind::Bucket => "Bucket",
            NodeKind::Route => "Route",
        };
        f.write_str(name)
    }
}

/// Reference to a node by scope and id
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub scope: ScopeId,
    pub id: String,
}

/// Authentication required by a public endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointAuth {
    /// Anyone who knows the URL may invoke the function
    None,
    /// Callers must sign requests with cloud credentials
    Iam,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    /// Service principal allowed to assume the role
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    pub function_name: String,
    pub handler: String,
    pub runtime: String,
    pub memory_size: u32,
    /// Seconds
    pub timeout: u32,
    pub code: ArtifactRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointProperties {
    pub auth_type: EndpointAuth,
}

/// What happens to a bucket when its stack is deleted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalPolicy {
    /// Delete the bucket along with the stack
    Destroy,
    /// Orphan the bucket
    Retain,
    /// Keep a snapshot, then delete
    Snapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketProperties {
    pub bucket_name: String,
    /// Provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removal_policy: Option<RemovalPolicy>,
    /// Empty the bucket before it is destroyed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_delete_objects: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteProperties {
    /// Integration forwarding every request to the function
    pub default_integration: String,
}

/// Typed properties of a node; the variant determines its kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeProperties {
    Role(RoleProperties),
    Function(FunctionProperties),
    Endpoint(EndpointProperties),
    Bucket(BucketProperties),
    Route(RouteProperties),
}

impl NodeProperties {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeProperties::Role(_) => NodeKind::Role,
            NodeProperties::Function(_) => NodeKind::Function,
            NodeProperties::Endpoint(_) => NodeKind::Endpoint,
            NodeProperties::Bucket(_) => NodeKind::Bucket,
            NodeProperties::Route(_) => NodeKind::Route,
        }
    }
}

/// A declarative resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceNode {
    pub scope: ScopeId,
    pub id: String,
    /// Node this one is bound to
    pub parent: Option<NodeRef>,
    pub properties: NodeProperties,
}

impl ResourceNode {
    pub fn kind(&self) -> NodeKind {
        self.properties.kind()
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            scope: self.scope,
            id: self.id.clone(),
        }
    }
}

/// Named value exposed once the graph is materialized.
///
/// The value is an attribute of a node, known only to the provisioner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub scope: ScopeId,
    pub key: String,
    pub node: NodeRef,
    pub attribute: String,
}

/// Resource nodes and outputs keyed by (scope, id)
#[derive(Clone, Debug, Default)]
pub struct ResourceGraph {
    scopes: Vec<Scope>,
    nodes: Vec<ResourceNode>,
    outputs: Vec<Output>,
    taken: HashSet<(ScopeId, String)>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level scope
    pub fn add_root_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            parent: None,
        });
        id
    }

    /// Add a scope nested in `parent`; its name takes an id in the parent
    pub fn add_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> Result<ScopeId> {
        let name = name.into();
        self.require_scope(parent, &name)?;
        self.claim(parent, &name)?;

        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name,
            parent: Some(parent),
        });
        Ok(id)
    }

    /// Add a node, rejecting duplicate ids, unreachable parents and
    /// parents of the wrong kind
    pub fn add_node(
        &mut self,
        scope: ScopeId,
        id: impl Into<String>,
        parent: Option<&NodeRef>,
        properties: NodeProperties,
    ) -> Result<NodeRef> {
        let id = id.into();
        self.require_scope(scope, &id)?;
        let found = match parent {
            Some(parent) => {
                self.require_reachable(scope, &id, parent)?;
                self.node(parent).map(ResourceNode::kind)
            }
            None => None,
        };

        let kind = properties.kind();
        let expected = kind.parent_kind();
        if found != expected {
            return Err(InfraError::InvalidParent {
                scope: self.scope_path(scope),
                id,
                kind,
                expected: kind_name(expected),
                found: kind_name(found),
            });
        }
        self.claim(scope, &id)?;

        self.nodes.push(ResourceNode {
            scope,
            id: id.clone(),
            parent: parent.cloned(),
            properties,
        });
        Ok(NodeRef { scope, id })
    }

    /// Add an output exposing `attribute` of `node`.
    ///
    /// Unlike a node parent, the exposed node may live in any scope.
    pub fn add_output(
        &mut self,
        scope: ScopeId,
        key: impl Into<String>,
        node: &NodeRef,
        attribute: impl Into<String>,
    ) -> Result<()> {
        let key = key.into();
        self.require_scope(scope, &key)?;
        if self.node(node).is_none() {
            return Err(self.dangling(scope, &key, node));
        }
        self.claim(scope, &key)?;

        self.outputs.push(Output {
            scope,
            key,
            node: node.clone(),
            attribute: attribute.into(),
        });
        Ok(())
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn node(&self, node: &NodeRef) -> Option<&ResourceNode> {
        self.nodes
            .iter()
            .find(|n| n.scope == node.scope && n.id == node.id)
    }

    pub fn output(&self, scope: ScopeId, key: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.scope == scope && o.key == key)
    }

    /// Dependency edges as (node, parent) pairs
    pub fn edges(&self) -> impl Iterator<Item = (&ResourceNode, &NodeRef)> {
        self.nodes
            .iter()
            .filter_map(|n| n.parent.as_ref().map(|p| (n, p)))
    }

    /// Slash-separated path from the root scope
    pub fn scope_path(&self, scope: ScopeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            match self.scopes.get(id.0) {
                Some(s) => {
                    names.push(s.name.as_str());
                    current = s.parent;
                }
                None => break,
            }
        }
        names.reverse();
        names.join("/")
    }

    /// Full path of a node
    pub fn node_path(&self, node: &NodeRef) -> String {
        format!("{}/{}", self.scope_path(node.scope), node.id)
    }

    /// Deferred reference to an output's value, e.g. `${Stack/Construct/fn-url.Url}`
    pub fn render_output(&self, output: &Output) -> String {
        format!("${{{}.{}}}", self.node_path(&output.node), output.attribute)
    }

    fn require_scope(&self, scope: ScopeId, id: &str) -> Result<()> {
        if scope.0 < self.scopes.len() {
            Ok(())
        } else {
            Err(InfraError::DanglingReference {
                scope: format!("#{}", scope.0),
                from: id.to_string(),
                target: "scope".to_string(),
            })
        }
    }

    fn require_reachable(&self, scope: ScopeId, from: &str, target: &NodeRef) -> Result<()> {
        let visible = self.is_ancestor_or_self(target.scope, scope);
        if visible && self.node(target).is_some() {
            return Ok(());
        }
        Err(self.dangling(scope, from, target))
    }

    fn dangling(&self, scope: ScopeId, from: &str, target: &NodeRef) -> InfraError {
        InfraError::DanglingReference {
            scope: self.scope_path(scope),
            from: from.to_string(),
            target: self.node_path(target),
        }
    }

    fn is_ancestor_or_self(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scopes.get(id.0).and_then(|s| s.parent);
        }
        false
    }

    fn claim(&mut self, scope: ScopeId, id: &str) -> Result<()> {
        if !self.taken.insert((scope, id.to_string())) {
            return Err(InfraError::DuplicateId {
                scope: self.scope_path(scope),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn kind_name(kind: Option<NodeKind>) -> String {
    kind.map_or_else(|| "none".to_string(), |k| k.to_string())
}
