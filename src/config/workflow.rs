//! Workflow definition files

use crate::graph::{
    DeclaredOutput, Edge, EdgeCondition, ExecutorBinding, ExecutorSpec, RequestPortRef,
    TypeDescriptor, TypeRef, WorkflowDefinition, WorkflowRef,
};
use serde::{Deserialize, Serialize};

/// Output type spelling for executors that produce nothing
pub const VOID_OUTPUT: &str = "()";

/// Executor kind - explicit, not inferred
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Ordinary executor
    #[default]
    Plain,
    /// Pause for human input
    RequestPort,
    /// Delegate to a nested workflow
    SubWorkflow,
}

/// Edge shape
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// One source, one sink, optional condition
    #[default]
    Direct,
    /// One source, many sinks
    FanOut,
    /// Many sources, one sink
    FanIn,
}

/// Configuration for a single executor
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Executor id (unique within workflow)
    pub id: String,

    #[serde(default)]
    pub kind: ExecutorKind,

    /// Implementation type identity
    #[serde(default)]
    pub implementation: TypeDescriptor,

    /// Declared output type; `"()"` declares a void executor
    pub output: Option<String>,

    /// Explicit agent-host tag
    pub agentic: Option<bool>,

    /// Port id (request_port executors)
    pub port: Option<String>,

    pub request_type: Option<TypeRef>,

    pub response_type: Option<TypeRef>,

    /// Nested workflow name (sub_workflow executors)
    pub workflow: Option<String>,
}

impl ExecutorConfig {
    fn spec(&self) -> ExecutorSpec {
        ExecutorSpec {
            implementation: self.implementation.clone(),
            declared_output: self.output.as_deref().map(|output| match output.trim() {
                VOID_OUTPUT => DeclaredOutput::Void,
                ty => DeclaredOutput::Typed(TypeRef::new(ty)),
            }),
            agentic: self.agentic,
        }
    }

    fn binding(&self) -> ExecutorBinding {
        let spec = self.spec();
        match self.kind {
            ExecutorKind::Plain => ExecutorBinding::Plain(spec),
            ExecutorKind::RequestPort => ExecutorBinding::RequestPort {
                spec,
                port: RequestPortRef {
                    id: self.port.clone().unwrap_or_else(|| self.id.clone()),
                    request_type: self.request_type.clone(),
                    response_type: self.response_type.clone(),
                },
            },
            ExecutorKind::SubWorkflow => ExecutorBinding::SubWorkflow {
                spec,
                workflow: WorkflowRef::new(self.workflow.clone().unwrap_or_default()),
            },
        }
    }
}

/// Configuration for a single edge
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeConfig {
    #[serde(default)]
    pub kind: EdgeKind,

    /// Source executor (direct, fan_out)
    pub source: Option<String>,

    /// Source executors (fan_in)
    #[serde(default)]
    pub sources: Vec<String>,

    /// Sink executor (direct, fan_in)
    pub sink: Option<String>,

    /// Sink executors (fan_out)
    #[serde(default)]
    pub sinks: Vec<String>,

    /// Routing expression (direct only)
    #[serde(rename = "if")]
    pub condition: Option<String>,

    /// Display name for the condition
    pub condition_name: Option<String>,
}

impl EdgeConfig {
    fn describe(&self, index: usize) -> String {
        format!("edge #{} ({:?})", index + 1, self.kind)
    }

    fn condition(&self) -> Option<EdgeCondition> {
        let expression = self.condition.clone()?;
        Some(match self.condition_name {
            Some(ref name) => EdgeCondition::named(name.clone(), expression),
            None => EdgeCondition::new(expression),
        })
    }
}

/// Full workflow file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowFile {
    /// Workflow name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Start executor id
    pub start: String,

    #[serde(default)]
    pub executors: Vec<ExecutorConfig>,

    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
}

impl WorkflowFile {
    /// Validate the file structure.
    ///
    /// Edges naming unknown executors are not reported here; the routing
    /// model tolerates them and records diagnostics instead.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.start.trim().is_empty() {
            errors.push("workflow is missing 'start'".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for executor in &self.executors {
            if executor.id.trim().is_empty() {
                errors.push("executor with empty id".to_string());
            } else if !seen.insert(executor.id.as_str()) {
                errors.push(format!("duplicate executor id: {}", executor.id));
            }

            match executor.kind {
                ExecutorKind::Plain => {
                    if executor.port.is_some() || executor.workflow.is_some() {
                        errors.push(format!(
                            "plain executor '{}' cannot declare 'port' or 'workflow'",
                            executor.id
                        ));
                    }
                }
                ExecutorKind::RequestPort => {
                    if executor.workflow.is_some() {
                        errors.push(format!(
                            "request_port executor '{}' cannot declare 'workflow'",
                            executor.id
                        ));
                    }
                }
                ExecutorKind::SubWorkflow => {
                    if executor.port.is_some() {
                        errors.push(format!(
                            "sub_workflow executor '{}' cannot declare 'port'",
                            executor.id
                        ));
                    }
                    if executor.workflow.as_deref().is_none_or(str::is_empty) {
                        errors.push(format!(
                            "sub_workflow executor '{}' missing 'workflow' field",
                            executor.id
                        ));
                    }
                }
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            let label = edge.describe(index);
            match edge.kind {
                EdgeKind::Direct => {
                    if edge.source.is_none() || edge.sink.is_none() {
                        errors.push(format!("{} requires 'source' and 'sink'", label));
                    }
                    if !edge.sources.is_empty() || !edge.sinks.is_empty() {
                        errors.push(format!("{} cannot use 'sources' or 'sinks'", label));
                    }
                }
                EdgeKind::FanOut => {
                    if edge.source.is_none() {
                        errors.push(format!("{} requires 'source'", label));
                    }
                    if edge.sink.is_some() || !edge.sources.is_empty() {
                        errors.push(format!("{} uses 'sinks', not 'sink' or 'sources'", label));
                    }
                }
                EdgeKind::FanIn => {
                    if edge.sources.is_empty() || edge.sink.is_none() {
                        errors.push(format!("{} requires 'sources' and 'sink'", label));
                    }
                    if edge.source.is_some() || !edge.sinks.is_empty() {
                        errors.push(format!("{} uses 'sources', not 'source' or 'sinks'", label));
                    }
                }
            }

            if edge.kind != EdgeKind::Direct && edge.condition.is_some() {
                errors.push(format!("{} cannot carry a condition", label));
            }
            if edge.condition.is_none() && edge.condition_name.is_some() {
                errors.push(format!("{} names a condition without 'if'", label));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, then convert into an in-memory definition.
    ///
    /// Fan-in edges are registered under each of their sources.
    pub fn into_definition(self) -> Result<WorkflowDefinition, Vec<String>> {
        self.validate()?;

        let mut definition = WorkflowDefinition::new(self.name.clone(), self.start.clone());

        for executor in &self.executors {
            definition.add_executor(executor.id.clone(), executor.binding());
        }

        for edge in &self.edges {
            match edge.kind {
                EdgeKind::Direct => {
                    let source = edge.source.clone().unwrap_or_default();
                    let sink = edge.sink.clone().unwrap_or_default();
                    let direct = Edge::direct(source.clone(), sink, edge.condition());
                    definition.add_edge(source, direct);
                }
                EdgeKind::FanOut => {
                    let source = edge.source.clone().unwrap_or_default();
                    let fan_out = Edge::fan_out(source.clone(), edge.sinks.clone());
                    definition.add_edge(source, fan_out);
                }
                EdgeKind::FanIn => {
                    let sink = edge.sink.clone().unwrap_or_default();
                    let fan_in = Edge::fan_in(edge.sources.clone(), sink);
                    for source in &edge.sources {
                        definition.add_edge(source.clone(), fan_in.clone());
                    }
                }
            }
        }

        Ok(definition)
    }
}
