//! Error and diagnostic types for graph extraction

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Irregularities tolerated while building a routing model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphDiagnostic {
    /// An edge names a sink that is not a known executor
    DanglingSink { source: String, sink: String },

    /// An edge group is keyed by a source that is not a known executor
    UnknownSource { source: String },
}

impl fmt::Display for GraphDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingSink { source, sink } => {
                write!(f, "edge '{}' -> '{}' targets unknown executor", source, sink)
            }
            Self::UnknownSource { source } => {
                write!(f, "edges declared for unknown executor '{}'", source)
            }
        }
    }
}

/// Errors from graph extraction and routing
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid argument: workflow definition is required")]
    MissingWorkflow,

    #[error("unknown executor '{id}'")]
    UnknownExecutor { id: String },

    #[error("condition on edge '{source_id}' -> '{sink_id}' failed: {error}")]
    Condition {
        source_id: String,
        sink_id: String,
        #[source]
        error: minijinja::Error,
    },

    #[error("workflow has dangling references:\n  {}", format_diagnostics(.0))]
    DanglingReferences(Vec<GraphDiagnostic>),
}

fn format_diagnostics(diagnostics: &[GraphDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}
