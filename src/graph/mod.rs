//! Routing graph extraction
//!
//! This module handles:
//! - Classifying executors (agent hosts, request ports, sub-workflows)
//! - Building the routing model (successors, predecessors, edge conditions,
//!   output types, start executor)
//! - Evaluating edge conditions against message payloads
//!
//! # Example
//!
//! ```ignore
//! use superstep_router::graph::{EdgeCondition, WorkflowDefinition, build_routing_model};
//!
//! let workflow = WorkflowDefinition::new("parity", "a")
//!     .with_executor("a", binding_a)
//!     .with_executor("b", binding_b)
//!     .connect_if("a", "b", EdgeCondition::named("is_even", "message is even"));
//!
//! let model = build_routing_model(Some(&workflow))?;
//! let targets = model.route("a", &serde_json::json!(4))?;
//! ```

mod classify;
mod condition;
mod definition;
mod error;
mod output_type;
mod routing;

pub use classify::{AgentMarkers, ExecutorInfo, classify_executors, classify_executors_default};
pub use condition::EdgeCondition;
pub use definition::{
    DeclaredOutput, DirectEdgeData, Edge, EdgeConnection, ExecutorBinding, ExecutorSpec,
    GenericSpec, RequestPortRef, TypeDescriptor, TypeRef, WorkflowDefinition, WorkflowRef,
};
pub use error::{GraphDiagnostic, GraphError};
pub use output_type::{infer_output_type, resolve_output_type};
pub use routing::{EdgeKey, RoutingModel, build_routing_model};
