//! fixflow CLI: command-line interface for the IT-support task orchestrator.
//!
//! Reuses the same core domain logic (fixflow-core) and server bootstrap
//! (fixflow-server) that back the HTTP API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fixflow_cli::commands;

/// fixflow: plan, approve and run IT-support requests
#[derive(Parser)]
#[command(name = "fixflow", version, about = "fixflow: IT-support task orchestrator")]
pub struct Cli {
    /// Path to an optional YAML config file
    #[arg(long, env = "FIXFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the fixflow HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Execute a request once and print the resulting task as JSON
    Run {
        /// Free-text support request
        request: String,
        /// Only plan the request and store it for approval
        #[arg(long)]
        require_approval: bool,
    },

    /// Show the steps the planner picks for a request
    Plan {
        /// Free-text support request
        request: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    commands::load_dotenv();

    let result = match cli.command {
        Commands::Server { host, port } => {
            commands::server::run(cli.config.as_deref(), host, port).await
        }
        Commands::Run {
            request,
            require_approval,
        } => {
            init_tracing();
            match commands::init_state(cli.config.as_deref()) {
                Ok(state) => commands::run::run(&state, &request, require_approval).await,
                Err(e) => Err(e),
            }
        }
        Commands::Plan { request } => {
            init_tracing();
            match commands::init_state(cli.config.as_deref()) {
                Ok(state) => commands::plan::run(&state, &request).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fixflow_core=warn,fixflow_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
