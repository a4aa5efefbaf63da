mod commands;
mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ionos")]
#[command(about = "Create, inspect and delete IONOS Cloud resources", long_about = None)]
struct Cli {
    /// Location of regional resources (de/fra, es/vit, ...)
    #[arg(short, long, global = true, env = "IONOS_LOCATION")]
    location: Option<String>,

    /// How long to wait for a resource to settle (90s, 10m, 1h)
    #[arg(short, long, global = true)]
    timeout: Option<String>,

    /// Give up on the whole command after this long (90s, 10m, 1h)
    #[arg(long, global = true)]
    deadline: Option<String>,

    /// Directory holding `.ionos/state.json`
    #[arg(long, global = true, default_value = ".")]
    state_dir: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitoring pipelines
    #[command(subcommand)]
    Pipeline(PipelineCommands),
    /// Object storage access keys
    #[command(subcommand, name = "access-key")]
    AccessKey(AccessKeyCommands),
    /// Object storage regions
    #[command(subcommand)]
    Region(RegionCommands),
    /// Locally tracked resources
    #[command(subcommand)]
    State(StateCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a pipeline and wait until it is available
    Create {
        #[arg(short, long)]
        name: String,
    },
    /// Show a pipeline by ID
    Get { id: String },
    /// Find the single pipeline with the given name
    Find {
        #[arg(short, long)]
        name: String,
    },
    /// Rename a pipeline
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
    },
    /// Delete a pipeline and wait until it is gone
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum AccessKeyCommands {
    /// Create an access key; the secret is shown once and kept in state
    Create {
        #[arg(short, long)]
        description: String,
    },
    /// Show an access key by ID
    Get { id: String },
    /// Find the single access key matching a description or key string
    Find {
        #[arg(short, long, conflicts_with = "access_key", required_unless_present = "access_key")]
        description: Option<String>,
        #[arg(short, long)]
        access_key: Option<String>,
    },
    /// Change the description of an access key
    Update {
        id: String,
        #[arg(short, long)]
        description: String,
    },
    /// Delete an access key and wait until it is gone
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum RegionCommands {
    /// Show a region by ID
    Get { id: String },
    /// List all regions
    List,
}

#[derive(Subcommand)]
pub enum StateCommands {
    /// List tracked resources
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    // Commands that need neither credentials nor the network
    match cli.command {
        Commands::Version => {
            println!("ionos {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::State(StateCommands::List) => {
            return commands::state::handle_list(&cli.state_dir).await;
        }
        _ => {}
    }

    let session = session::Session::open(
        cli.location.unwrap_or_default(),
        cli.timeout.as_deref(),
        cli.deadline.as_deref(),
        &cli.state_dir,
    )?;

    match cli.command {
        Commands::Pipeline(cmd) => commands::pipeline::handle(&session, cmd).await,
        Commands::AccessKey(cmd) => commands::access_key::handle(&session, cmd).await,
        Commands::Region(cmd) => commands::region::handle(&session, cmd).await,
        Commands::State(_) | Commands::Version => Ok(()),
    }
}
