//! MERGE Fetcher CLI application
//!
//! Command-line interface for bulk-downloading CPTEC/INPE MERGE hourly
//! precipitation files with bounded concurrency and request pacing.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use merge_fetcher::cli::{handle_config, handle_download, Cli, Commands};
use merge_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("MERGE Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &cli.global).await
        }
        Commands::Config(args) => handle_config(args, &cli.global).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = match format!("merge_fetcher={}", log_level).parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
