//! Superstep routing model for durable workflow graphs.
//!
//! Turns a workflow definition (executors plus edge groups) into the
//! adjacency lists, output types and edge conditions a superstep
//! orchestrator needs, classifies executors, and provides the envelope
//! used to carry messages between executors.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod graph;
pub mod logging;

pub use envelope::{DurableMessageEnvelope, EnvelopeError};
pub use graph::{
    ExecutorInfo, GraphDiagnostic, GraphError, RoutingModel, WorkflowDefinition,
    build_routing_model, classify_executors,
};
