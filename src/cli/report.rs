//! Command results, rendered as text or JSON

use crate::envelope::DurableMessageEnvelope;
use crate::graph::{ExecutorInfo, GraphDiagnostic, RoutingModel};
use serde::Serialize;
use std::fmt::Write;

/// Routes of one executor
#[derive(Debug, Clone, Serialize)]
pub struct ExecutorRoutes {
    pub id: String,
    pub output_type: Option<String>,
    pub successors: Vec<String>,
    pub predecessors: Vec<String>,
}

/// One conditional edge
#[derive(Debug, Clone, Serialize)]
pub struct ConditionReport {
    pub source: String,
    pub sink: String,
    pub name: Option<String>,
    pub expression: String,
}

/// Flattened view of a routing model
#[derive(Debug, Clone, Serialize)]
pub struct RoutingReport {
    pub workflow: String,
    pub start: String,
    pub executors: Vec<ExecutorRoutes>,
    pub conditions: Vec<ConditionReport>,
    pub diagnostics: Vec<GraphDiagnostic>,
}

impl RoutingReport {
    pub fn from_model(workflow: &str, model: &RoutingModel) -> Self {
        let executors = model
            .executor_ids()
            .iter()
            .map(|id| ExecutorRoutes {
                id: id.clone(),
                output_type: model.output_type(id).map(ToString::to_string),
                successors: model.successors_of(id).to_vec(),
                predecessors: model.predecessors_of(id).to_vec(),
            })
            .collect();

        let mut conditions: Vec<_> = model.edge_conditions().iter().collect();
        conditions.sort_by(|a, b| a.0.cmp(b.0));
        let conditions = conditions
            .into_iter()
            .map(|(key, condition)| ConditionReport {
                source: key.source_id.clone(),
                sink: key.sink_id.clone(),
                name: condition.name().map(str::to_string),
                expression: condition.expression().to_string(),
            })
            .collect();

        Self {
            workflow: workflow.to_string(),
            start: model.start_executor_id().to_string(),
            executors,
            conditions,
            diagnostics: model.diagnostics().to_vec(),
        }
    }
}

/// Result of a `route` command
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub source: String,
    pub targets: Vec<String>,
}

/// Anything a command prints as its result
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Routing(RoutingReport),
    Executors(Vec<ExecutorInfo>),
    Route(RouteReport),
    Envelope(DurableMessageEnvelope),
}

impl Report {
    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            Report::Routing(report) => {
                let _ = writeln!(out, "workflow: {}", report.workflow);
                let _ = writeln!(out, "start: {}", report.start);
                for executor in &report.executors {
                    let output = executor.output_type.as_deref().unwrap_or("-");
                    let successors = executor.successors.join(", ");
                    let _ = writeln!(out, "  {} -> [{}]", executor.id, successors);
                    let _ = writeln!(
                        out,
                        "      from [{}], output {}",
                        executor.predecessors.join(", "),
                        output
                    );
                }
                if !report.conditions.is_empty() {
                    let _ = writeln!(out, "conditions:");
                    for c in &report.conditions {
                        let label = c.name.as_deref().unwrap_or(&c.expression);
                        let _ = writeln!(out, "  {} -> {}: {}", c.source, c.sink, label);
                    }
                }
                if !report.diagnostics.is_empty() {
                    let _ = writeln!(out, "diagnostics:");
                    for d in &report.diagnostics {
                        let _ = writeln!(out, "  ! {}", d);
                    }
                }
            }
            Report::Executors(infos) => {
                for info in infos {
                    let mut tags = Vec::new();
                    if info.is_agentic {
                        tags.push("agent".to_string());
                    }
                    if let Some(ref port) = info.request_port {
                        tags.push(format!("request_port={}", port.id));
                    }
                    if let Some(ref workflow) = info.sub_workflow {
                        tags.push(format!("sub_workflow={}", workflow.name));
                    }
                    if tags.is_empty() {
                        tags.push("plain".to_string());
                    }
                    let _ = writeln!(out, "{} ({})", info.id, tags.join(", "));
                }
            }
            Report::Route(route) => {
                if route.targets.is_empty() {
                    let _ = writeln!(out, "{} routes nowhere", route.source);
                } else {
                    let _ = writeln!(out, "{} -> {}", route.source, route.targets.join(", "));
                }
            }
            Report::Envelope(envelope) => {
                let json = envelope
                    .to_json()
                    .unwrap_or_else(|e| format!("<unserializable envelope: {}>", e));
                let _ = writeln!(out, "{}", json);
            }
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        EdgeCondition, ExecutorBinding, ExecutorSpec, RequestPortRef, WorkflowDefinition,
        build_routing_model, classify_executors_default,
    };

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition::new("parity", "A")
            .with_executor("A", ExecutorBinding::Plain(ExecutorSpec::default()))
            .with_executor("B", ExecutorBinding::Plain(ExecutorSpec::default()))
            .with_executor(
                "C",
                ExecutorBinding::RequestPort {
                    spec: ExecutorSpec::default(),
                    port: RequestPortRef::new("confirm"),
                },
            )
            .connect("A", "B")
            .connect_if("B", "C", EdgeCondition::named("is_even", "message is even"))
            .connect("C", "ghost")
    }

    #[test]
    fn test_routing_report() {
        let model = build_routing_model(Some(&workflow())).unwrap();
        let report = RoutingReport::from_model("parity", &model);

        let ids: Vec<_> = report.executors.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(report.executors[1].successors, vec!["C"]);
        assert_eq!(report.conditions.len(), 1);
        assert_eq!(report.conditions[0].name.as_deref(), Some("is_even"));
        assert_eq!(report.diagnostics.len(), 1);

        let text = Report::Routing(report).to_text();
        assert!(text.contains("start: A"));
        assert!(text.contains("B -> C: is_even"));
        assert!(text.contains("ghost"));
    }

    #[test]
    fn test_executors_text() {
        let infos = classify_executors_default(Some(&workflow())).unwrap();
        let text = Report::Executors(infos).to_text();
        assert!(text.contains("A (plain)"));
        assert!(text.contains("C (request_port=confirm)"));
    }

    #[test]
    fn test_route_json_shape() {
        let report = Report::Route(RouteReport {
            source: "B".into(),
            targets: vec!["C".into()],
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "B");
        assert_eq!(json["targets"][0], "C");
        assert_eq!(report.to_text(), "B -> C");
    }

    #[test]
    fn test_envelope_text_is_json() {
        let report = Report::Envelope(DurableMessageEnvelope::for_input("hi", None));
        assert_eq!(report.to_text(), r#"{"message":"hi"}"#);
    }
}
