//! Configuration types and loading for superstep

mod loader;
mod workflow;

pub use loader::{LoggingConfig, RouterConfig, RoutingConfig, load_workflow};
pub use workflow::{EdgeConfig, EdgeKind, ExecutorConfig, ExecutorKind, VOID_OUTPUT, WorkflowFile};
