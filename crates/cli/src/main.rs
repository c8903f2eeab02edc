//! DocQA CLI
//!
//! Ingest documents, ask questions about them, or serve the HTTP API.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, QueryCommand, ServeCommand};
use docqa_core::{logging, AppResult, Settings, StoreBackend};
use std::path::PathBuf;

/// DocQA - question answering over your own documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Question answering over local documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding documents to ingest
    #[arg(long, global = true)]
    files_directory: Option<PathBuf>,

    /// Vector database location
    #[arg(long, global = true)]
    db: Option<String>,

    /// Vector store backend (lancedb, memory)
    #[arg(long, global = true)]
    store: Option<StoreBackend>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest every supported file in a directory
    Ingest(IngestCommand),

    /// Ask a question
    Query(QueryCommand),

    /// Run the HTTP API
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.files_directory,
        cli.db,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    if let Some(backend) = cli.store {
        settings.store.backend = backend;
    }

    logging::init_logging(settings.logging.level.as_deref(), settings.logging.no_color)?;
    settings.validate()?;

    tracing::debug!("Files directory: {:?}", settings.files_directory);
    tracing::debug!(
        "Store: {} at {} ({})",
        settings.store.backend,
        settings.store.persisted_db,
        settings.store.similarity_metric
    );

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Query(_) => "query",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&settings).await,
        Commands::Query(cmd) => cmd.execute(&settings).await,
        Commands::Serve(cmd) => cmd.execute(settings).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
