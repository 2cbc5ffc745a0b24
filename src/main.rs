use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use superstep_router::cli::{self, OutputEvent, OutputMode};
use superstep_router::config::RouterConfig;
use superstep_router::logging;

#[derive(Parser)]
#[command(name = "superstep")]
#[command(about = "Inspect the superstep routing model of durable workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to current)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Also write a log file under the user config directory
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show successors, predecessors, output types and conditions
    Inspect {
        /// Workflow name or path
        workflow: String,
    },

    /// Classify executors (agent, request port, sub-workflow)
    Executors {
        /// Workflow name or path
        workflow: String,
    },

    /// Validate a workflow file
    Validate {
        /// Workflow name or path
        workflow: String,

        /// Fail on edges that reference unknown executors
        #[arg(long)]
        strict: bool,
    },

    /// Evaluate the outgoing edges of an executor for a JSON payload
    Route {
        /// Workflow name or path
        workflow: String,

        /// Source executor id
        source: String,

        /// Message payload as JSON
        payload: String,
    },

    /// Wrap a message in a durable envelope
    Envelope {
        /// Serialized message
        message: String,

        /// Type name of the message
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Id of the executor that produced the message
        #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
        source: Option<String>,
    },
}

impl Commands {
    fn log_name(&self) -> &str {
        match self {
            Commands::Inspect { workflow }
            | Commands::Executors { workflow }
            | Commands::Validate { workflow, .. }
            | Commands::Route { workflow, .. } => workflow,
            Commands::Envelope { .. } => "envelope",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_dir = cli.dir.as_deref();
    let config = RouterConfig::load(project_dir)?;

    let log_file = match config.logging.file_path() {
        Some(path) => Some(path),
        None if cli.log => {
            let name = std::path::Path::new(cli.command.log_name())
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "superstep".to_string());
            Some(logging::default_log_path(&name)?)
        }
        None => None,
    };
    logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let handler = cli::create_handler(OutputMode::from_flags(cli.json, cli.quiet), cli.debug);

    let result = match cli.command {
        Commands::Inspect { workflow } => cli::inspect(&workflow, project_dir, &*handler),
        Commands::Executors { workflow } => {
            cli::list_executors(&workflow, project_dir, &config, &*handler)
        }
        Commands::Validate { workflow, strict } => Ok(cli::validate_workflow(
            &workflow,
            project_dir,
            strict || config.routing.strict,
            &*handler,
        )),
        Commands::Route {
            workflow,
            source,
            payload,
        } => cli::route(&workflow, project_dir, &source, &payload, &*handler),
        Commands::Envelope {
            message,
            type_name,
            source,
        } => cli::envelope(&message, type_name, source, &*handler),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            handler.emit(OutputEvent::Error { error });
            1
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
