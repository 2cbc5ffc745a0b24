//! Executor classification
//!
//! Tells the consumer which executors need special handling: agent hosts,
//! human-in-the-loop request ports and nested sub-workflows.

use super::definition::{
    ExecutorBinding, RequestPortRef, TypeDescriptor, WorkflowDefinition, WorkflowRef,
};
use super::error::GraphError;
use serde::{Deserialize, Serialize};

/// Naming convention that identifies agent-hosting executors
///
/// An executor without an explicit `agentic` tag is treated as an agent host
/// when its fully qualified name contains `agent_type_marker` and its module
/// is exactly `agent_namespace_marker`, both compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentMarkers {
    #[serde(default = "default_type_marker")]
    pub agent_type_marker: String,

    #[serde(default = "default_namespace_marker")]
    pub agent_namespace_marker: String,
}

fn default_type_marker() -> String {
    "AIAgentHostExecutor".into()
}

fn default_namespace_marker() -> String {
    "Microsoft.Agents.AI.Workflows".into()
}

impl Default for AgentMarkers {
    fn default() -> Self {
        Self {
            agent_type_marker: default_type_marker(),
            agent_namespace_marker: default_namespace_marker(),
        }
    }
}

impl AgentMarkers {
    pub fn matches(&self, implementation: &TypeDescriptor) -> bool {
        contains_ignore_case(&implementation.full_name(), &self.agent_type_marker)
            && !self.agent_namespace_marker.is_empty()
            && implementation
                .module
                .eq_ignore_ascii_case(&self.agent_namespace_marker)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Classification of one executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutorInfo {
    pub id: String,

    pub is_agentic: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_port: Option<RequestPortRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_workflow: Option<WorkflowRef>,
}

impl ExecutorInfo {
    pub fn is_request_port_executor(&self) -> bool {
        self.request_port.is_some()
    }

    pub fn is_subworkflow_executor(&self) -> bool {
        self.sub_workflow.is_some()
    }
}

/// Classify every executor of `workflow`, in definition order
pub fn classify_executors(
    workflow: Option<&WorkflowDefinition>,
    markers: &AgentMarkers,
) -> Result<Vec<ExecutorInfo>, GraphError> {
    let workflow = workflow.ok_or(GraphError::MissingWorkflow)?;

    let infos = workflow
        .executors()
        .map(|(id, binding)| {
            let spec = binding.spec();
            let is_agentic = spec
                .agentic
                .unwrap_or_else(|| markers.matches(&spec.implementation));

            let (request_port, sub_workflow) = match binding {
                ExecutorBinding::Plain(_) => (None, None),
                ExecutorBinding::RequestPort { port, .. } => (Some(port.clone()), None),
                ExecutorBinding::SubWorkflow {
                    workflow: nested, ..
                } => (None, Some(nested.clone())),
            };

            ExecutorInfo {
                id: id.to_string(),
                is_agentic,
                request_port,
                sub_workflow,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        workflow = workflow.name(),
        executors = infos.len(),
        agentic = infos.iter().filter(|i| i.is_agentic).count(),
        "Classified executors"
    );

    Ok(infos)
}

/// [`classify_executors`] with the default agent markers
pub fn classify_executors_default(
    workflow: Option<&WorkflowDefinition>,
) -> Result<Vec<ExecutorInfo>, GraphError> {
    classify_executors(workflow, &AgentMarkers::default())
}
