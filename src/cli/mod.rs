//! CLI module for superstep
//!
//! This module provides:
//! - Command implementations (inspect, executors, validate, route, envelope)
//! - Output handlers (console, JSON, quiet)
//! - Reports rendered by those handlers
//!
//! # Example
//!
//! ```ignore
//! use superstep_router::cli::{commands, output};
//!
//! let handler = output::create_handler(output::OutputMode::Console, false);
//! let exit_code = commands::inspect("review", None, &*handler)?;
//! ```

pub mod commands;
pub mod output;
pub mod report;

pub use commands::{envelope, inspect, list_executors, route, validate_workflow};
pub use output::{OutputEvent, OutputHandler, OutputMode, create_handler};
pub use report::{Report, RouteReport, RoutingReport};
