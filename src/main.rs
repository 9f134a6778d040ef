//! paranoid-coder CLI entry point.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "paranoid-coder")]
#[command(about = "Incremental, graph-grounded codebase summarization and Q&A", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Emit machine-readable JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a `.paranoid-coder` project at the root
    Init,
    /// Extract the code graph (entities and relationships)
    Analyze {
        /// Re-extract every file, ignoring the AnalysisFileHash skip rule
        #[arg(long)]
        force: bool,
    },
    /// Generate descriptions for files and directories, bottom-up
    Summarize {
        /// Re-summarize every path, ignoring smart invalidation
        #[arg(long)]
        force: bool,
    },
    /// Embed summaries and/or entities into the vector index
    Index {
        /// Re-embed every object, ignoring staleness checks
        #[arg(long)]
        full: bool,
        /// Skip summaries
        #[arg(long)]
        no_summaries: bool,
        /// Skip entities
        #[arg(long)]
        no_entities: bool,
    },
    /// Ask a question about the codebase
    Ask {
        question: String,
        /// Skip classification and answer straight from the vector index
        #[arg(long)]
        force_rag: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("paranoid_coder={log_level}")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init => commands::init(&cli.root),
        Commands::Analyze { force } => commands::analyze(&cli.root, force, cli.json).await,
        Commands::Summarize { force } => commands::summarize(&cli.root, force, cli.json).await,
        Commands::Index { full, no_summaries, no_entities } => {
            commands::index(&cli.root, full, !no_summaries, !no_entities, cli.json).await
        }
        Commands::Ask { question, force_rag } => commands::ask(&cli.root, &question, force_rag, cli.json).await,
        Commands::Version => {
            println!("paranoid-coder v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
