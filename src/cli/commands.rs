//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use super::report::{Report, RouteReport, RoutingReport};
use crate::config::{RouterConfig, load_workflow};
use crate::envelope::DurableMessageEnvelope;
use crate::graph::{WorkflowDefinition, build_routing_model, classify_executors};
use std::path::Path;

fn load_definition(
    workflow_name: &str,
    working_dir: Option<&Path>,
    handler: &dyn OutputHandler,
) -> Result<WorkflowDefinition, String> {
    let workflow = load_workflow(workflow_name, working_dir)
        .map_err(|e| format!("Failed to load workflow '{}': {:#}", workflow_name, e))?;

    handler.emit(OutputEvent::WorkflowLoaded {
        name: workflow.name.clone(),
        executors: workflow.executors.len(),
        edges: workflow.edges.len(),
    });

    workflow.into_definition().map_err(|errors| {
        format!(
            "workflow '{}' is invalid:\n  {}",
            workflow_name,
            errors.join("\n  ")
        )
    })
}

/// Print the routing model of a workflow
pub fn inspect(
    workflow_name: &str,
    working_dir: Option<&Path>,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let definition = load_definition(workflow_name, working_dir, handler)?;
    let model = build_routing_model(Some(&definition)).map_err(|e| e.to_string())?;

    handler.report(&Report::Routing(RoutingReport::from_model(
        definition.name(),
        &model,
    )));
    Ok(0)
}

/// Print the executor classification of a workflow
pub fn list_executors(
    workflow_name: &str,
    working_dir: Option<&Path>,
    config: &RouterConfig,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let definition = load_definition(workflow_name, working_dir, handler)?;
    let infos =
        classify_executors(Some(&definition), &config.classifier).map_err(|e| e.to_string())?;

    handler.report(&Report::Executors(infos));
    Ok(0)
}

/// Validate a workflow file, optionally rejecting dangling references
pub fn validate_workflow(
    workflow_name: &str,
    working_dir: Option<&Path>,
    strict: bool,
    handler: &dyn OutputHandler,
) -> i32 {
    let definition = match load_definition(workflow_name, working_dir, handler) {
        Ok(definition) => definition,
        Err(error) => {
            handler.emit(OutputEvent::Error { error });
            return 1;
        }
    };

    let model = match build_routing_model(Some(&definition)) {
        Ok(model) => model,
        Err(e) => {
            handler.emit(OutputEvent::Error {
                error: e.to_string(),
            });
            return 1;
        }
    };

    let diagnostics: Vec<String> = model.diagnostics().iter().map(ToString::to_string).collect();

    if strict && model.ensure_no_dangling().is_err() {
        handler.emit(OutputEvent::Invalid {
            name: definition.name().to_string(),
            errors: diagnostics,
        });
        return 1;
    }

    for diagnostic in diagnostics {
        handler.emit(OutputEvent::Info {
            message: format!("warning: {}", diagnostic),
        });
    }
    handler.emit(OutputEvent::Valid {
        name: definition.name().to_string(),
    });
    0
}

/// Show which successors of `source` receive `payload`
pub fn route(
    workflow_name: &str,
    working_dir: Option<&Path>,
    source: &str,
    payload: &str,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let payload: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| format!("payload is not valid JSON: {}", e))?;

    let definition = load_definition(workflow_name, working_dir, handler)?;
    let model = build_routing_model(Some(&definition)).map_err(|e| e.to_string())?;
    let targets = model.route(source, &payload).map_err(|e| e.to_string())?;

    handler.report(&Report::Route(RouteReport {
        source: source.to_string(),
        targets: targets.into_iter().map(str::to_string).collect(),
    }));
    Ok(0)
}

/// Print a durable envelope for `message`
pub fn envelope(
    message: &str,
    type_name: Option<String>,
    source: Option<String>,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let envelope = match source {
        Some(source) if source.trim().is_empty() => {
            return Err("source executor id must not be empty".to_string());
        }
        Some(source) => DurableMessageEnvelope::from_executor(source, message, type_name),
        None => DurableMessageEnvelope::for_input(message, type_name),
    };

    handler.report(&Report::Envelope(envelope));
    Ok(0)
}
