//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use super::report::Report;
use serde::{Deserialize, Serialize};

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

impl OutputMode {
    /// Pick a mode from the global CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            Self::Json
        } else if quiet {
            Self::Quiet
        } else {
            Self::Console
        }
    }
}

/// Progress and status events emitted by commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    WorkflowLoaded {
        name: String,
        executors: usize,
        edges: usize,
    },
    Valid {
        name: String,
    },
    Invalid {
        name: String,
        errors: Vec<String>,
    },
    Error {
        error: String,
    },
    Info {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: OutputEvent);

    /// Write a command's result
    fn report(&self, report: &Report);
}

/// Console output handler
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::WorkflowLoaded {
                name,
                executors,
                edges,
            } => {
                if self.debug {
                    eprintln!(
                        "Loaded workflow '{}' ({} executors, {} edges)",
                        name, executors, edges
                    );
                }
            }
            OutputEvent::Valid { name } => {
                eprintln!("✓ Workflow '{}' is valid", name);
            }
            OutputEvent::Invalid { name, errors } => {
                eprintln!("✗ Workflow '{}' has {} error(s):", name, errors.len());
                for err in &errors {
                    eprintln!("  - {}", err);
                }
            }
            OutputEvent::Error { error } => {
                eprintln!("Error: {}", error);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
        }
    }

    fn report(&self, report: &Report) {
        println!("{}", report.to_text());
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        match json {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize output"),
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }

    fn report(&self, report: &Report) {
        self.print_json(report);
    }
}

/// Quiet handler: only errors and the final result
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, event: OutputEvent) {
        if let OutputEvent::Error { error } = event {
            eprintln!("Error: {}", error);
        }
    }

    fn report(&self, report: &Report) {
        println!("{}", report.to_text());
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(true)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}
