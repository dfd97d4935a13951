//! Template synthesis and the provisioning seam

use crate::error::Result;
use crate::graph::{EndpointAuth, NodeKind, NodeProperties};
use crate::stack::Stack;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Serializable form of a built stack
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub stack_id: String,
    pub tags: BTreeMap<String, String>,
    pub resources: Vec<TemplateResource>,
    pub outputs: Vec<TemplateOutput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResource {
    /// Full path, e.g. `Stack/Construct/id`
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub properties: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOutput {
    pub scope: String,
    pub key: String,
    /// Deferred reference resolved by the provisioner
    pub value: String,
}

impl Template {
    pub fn from_stack(stack: &Stack) -> Result<Self> {
        let graph = stack.graph();

        let resources = graph
            .nodes()
            .iter()
            .map(|node| {
                Ok(TemplateResource {
                    path: graph.node_path(&node.node_ref()),
                    kind: node.kind(),
                    depends_on: node.parent.as_ref().map(|p| graph.node_path(p)),
                    properties: serde_json::to_value(&node.properties)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = graph
            .outputs()
            .iter()
            .map(|output| TemplateOutput {
                scope: graph.scope_path(output.scope),
                key: output.key.clone(),
                value: graph.render_output(output),
            })
            .collect();

        Ok(Self {
            stack_id: stack.stack_id().to_string(),
            tags: stack.tags().clone(),
            resources,
            outputs,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Materializes a finished template
pub trait Provisioner {
    fn provision(&self, template: &Template) -> Result<()>;
}

/// Writes templates to `<out_dir>/<stack_id>.template.json`
#[derive(Clone, Debug)]
pub struct TemplateSynthesizer {
    out_dir: PathBuf,
}

impl TemplateSynthesizer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn template_path(&self, stack_id: &str) -> PathBuf {
        self.out_dir.join(format!("{stack_id}.template.json"))
    }
}

impl Provisioner for TemplateSynthesizer {
    fn provision(&self, template: &Template) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.template_path(&template.stack_id);
        std::fs::write(&path, template.to_json()?)?;
        info!(path = %path.display(), "Wrote template");
        Ok(())
    }
}

/// Render a stack and hand it to a provisioner
pub fn synthesize(stack: &Stack, provisioner: &dyn Provisioner) -> Result<Template> {
    for node in stack.graph().nodes() {
        if let NodeProperties::Endpoint(props) = &node.properties {
            if props.auth_type == EndpointAuth::None {
                warn!(
                    endpoint = %stack.graph().node_path(&node.node_ref()),
                    "Endpoint is public and unauthenticated"
                );
            }
        }
    }

    let template = Template::from_stack(stack)?;
    provisioner.provision(&template)?;
    Ok(template)
}
