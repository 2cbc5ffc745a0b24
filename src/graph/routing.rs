//! Routing model construction
//!
//! The routing model is an adjacency list plus per-edge predicates. It is
//! built in one bounded pass over the edge collection, so cyclic workflows
//! need no special handling: routing is decided live, message by message,
//! by the superstep engine that consumes the model.

use super::condition::EdgeCondition;
use super::definition::{TypeRef, WorkflowDefinition};
use super::error::{GraphDiagnostic, GraphError};
use super::output_type::resolve_output_type;
use std::collections::HashMap;

/// `(source, sink)` pair identifying a direct edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source_id: String,
    pub sink_id: String,
}

impl EdgeKey {
    pub fn new(source_id: impl Into<String>, sink_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            sink_id: sink_id.into(),
        }
    }
}

/// Whole-workflow routing table
#[derive(Debug, Clone, Default)]
pub struct RoutingModel {
    start_executor_id: String,
    executor_ids: Vec<String>,
    successors: HashMap<String, Vec<String>>,
    predecessors: HashMap<String, Vec<String>>,
    output_types: HashMap<String, Option<TypeRef>>,
    edge_conditions: HashMap<EdgeKey, EdgeCondition>,
    diagnostics: Vec<GraphDiagnostic>,
}

/// Build the routing model for `workflow`
pub fn build_routing_model(
    workflow: Option<&WorkflowDefinition>,
) -> Result<RoutingModel, GraphError> {
    let workflow = workflow.ok_or(GraphError::MissingWorkflow)?;

    tracing::debug!(
        workflow = workflow.name(),
        executors = workflow.executor_count(),
        edges = workflow.edge_count(),
        "Building routing model"
    );

    let mut model = RoutingModel {
        start_executor_id: workflow.start_executor_id().to_string(),
        ..Default::default()
    };

    for (id, binding) in workflow.executors() {
        model.executor_ids.push(id.to_string());
        model.successors.insert(id.to_string(), Vec::new());
        model.predecessors.insert(id.to_string(), Vec::new());
        model
            .output_types
            .insert(id.to_string(), resolve_output_type(binding.spec()));
    }

    for (source, edges) in workflow.edge_groups() {
        let known_source = model.successors.contains_key(source);
        if !known_source {
            tracing::warn!(source, "Ignoring edges declared for unknown executor");
            model.record(GraphDiagnostic::UnknownSource {
                source: source.to_string(),
            });
        }

        for edge in edges {
            for sink in edge.sink_ids() {
                if !model.predecessors.contains_key(sink.as_str()) {
                    tracing::warn!(source, sink = %sink, "Ignoring edge to unknown executor");
                    model.record(GraphDiagnostic::DanglingSink {
                        source: source.to_string(),
                        sink: sink.clone(),
                    });
                    continue;
                }
                if !known_source {
                    continue;
                }

                if let Some(successors) = model.successors.get_mut(source) {
                    successors.push(sink.clone());
                }
                if let Some(predecessors) = model.predecessors.get_mut(sink.as_str()) {
                    predecessors.push(source.to_string());
                }
            }

            if let Some(ref direct) = edge.direct {
                if let Some(ref condition) = direct.condition {
                    model.edge_conditions.insert(
                        EdgeKey::new(direct.source_id.clone(), direct.sink_id.clone()),
                        condition.clone(),
                    );
                }
            }
        }
    }

    tracing::debug!(
        workflow = workflow.name(),
        conditions = model.edge_conditions.len(),
        diagnostics = model.diagnostics.len(),
        "Routing model built"
    );

    Ok(model)
}

impl RoutingModel {
    fn record(&mut self, diagnostic: GraphDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn start_executor_id(&self) -> &str {
        &self.start_executor_id
    }

    /// Known executor ids in definition order
    pub fn executor_ids(&self) -> &[String] {
        &self.executor_ids
    }

    pub fn contains_executor(&self, id: &str) -> bool {
        self.successors.contains_key(id)
    }

    pub fn successors(&self) -> &HashMap<String, Vec<String>> {
        &self.successors
    }

    pub fn predecessors(&self) -> &HashMap<String, Vec<String>> {
        &self.predecessors
    }

    pub fn output_types(&self) -> &HashMap<String, Option<TypeRef>> {
        &self.output_types
    }

    pub fn edge_conditions(&self) -> &HashMap<EdgeKey, EdgeCondition> {
        &self.edge_conditions
    }

    pub fn diagnostics(&self) -> &[GraphDiagnostic] {
        &self.diagnostics
    }

    /// Successors of `id` in declaration order; empty for unknown ids
    pub fn successors_of(&self, id: &str) -> &[String] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Predecessors of `id`; empty for unknown ids
    pub fn predecessors_of(&self, id: &str) -> &[String] {
        self.predecessors
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn output_type(&self, id: &str) -> Option<&TypeRef> {
        self.output_types.get(id).and_then(Option::as_ref)
    }

    pub fn condition(&self, source_id: &str, sink_id: &str) -> Option<&EdgeCondition> {
        self.edge_conditions.get(&EdgeKey::new(source_id, sink_id))
    }

    /// Successors of `source_id` that should receive `payload`.
    ///
    /// Unconditional edges always route; conditional edges route when their
    /// condition evaluates true against the payload.
    pub fn route(
        &self,
        source_id: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<&str>, GraphError> {
        let successors = self
            .successors
            .get(source_id)
            .ok_or_else(|| GraphError::UnknownExecutor {
                id: source_id.to_string(),
            })?;

        let mut targets = Vec::with_capacity(successors.len());
        for sink in successors {
            let routed = match self.condition(source_id, sink) {
                Some(condition) => {
                    condition
                        .evaluate(payload)
                        .map_err(|error| GraphError::Condition {
                            source_id: source_id.to_string(),
                            sink_id: sink.clone(),
                            error,
                        })?
                }
                None => true,
            };

            tracing::trace!(source = source_id, sink = %sink, routed, "Evaluated edge");
            if routed {
                targets.push(sink.as_str());
            }
        }

        Ok(targets)
    }

    /// Fail if construction tolerated any dangling references
    pub fn ensure_no_dangling(&self) -> Result<(), GraphError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(GraphError::DanglingReferences(self.diagnostics.clone()))
        }
    }
}
