//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the photoferry binary.

mod cache;
mod commands;
mod upload;

pub use cache::{handle_cache_stats, handle_hash, handle_lookup, handle_refresh};
pub use commands::{Cli, Commands};
pub use upload::handle_upload;

use photoferry::{ConfigError, Photoferry, PhotoferryConfig, PhotoferryResult};
use photoferry_interface::StaticCredential;
use std::path::Path;
use std::sync::Arc;

/// Environment variable holding the bearer token.
pub const TOKEN_VAR: &str = "PHOTOFERRY_TOKEN";

/// Load the explicit config file, or the layered defaults.
pub fn load_config(path: Option<&Path>) -> PhotoferryResult<PhotoferryConfig> {
    match path {
        Some(path) => PhotoferryConfig::from_file(path),
        None => PhotoferryConfig::load(),
    }
}

/// Connect with the token from the environment.
pub async fn connect(config: PhotoferryConfig) -> PhotoferryResult<Photoferry> {
    let token = std::env::var(TOKEN_VAR)
        .map_err(|_| ConfigError::new(format!("{} is not set", TOKEN_VAR)))?;
    let ferry = Photoferry::from_config(config, Arc::new(StaticCredential::new(token))).await?;
    if let Some(warning) = ferry.cache_warning() {
        eprintln!("warning: {}", warning);
    }
    Ok(ferry)
}
