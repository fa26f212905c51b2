//! Photoferry CLI binary.
//!
//! This binary provides command-line access to photoferry:
//! - Upload files and directory trees without duplicates
//! - Look up and refresh the identity cache
//! - Compute content digests

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, handle_cache_stats, handle_hash, handle_lookup, handle_refresh,
        handle_upload, load_config,
    };

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    let code = match cli.command {
        Commands::Upload(args) => handle_upload(config, args).await?,
        Commands::Lookup { digest } => handle_lookup(config, &digest).await?,
        Commands::Refresh { replace } => handle_refresh(config, replace).await?,
        Commands::Hash { file } => handle_hash(&file).await?,
        Commands::CacheStats => handle_cache_stats(config).await?,
    };

    Ok(code)
}
