//! Lookup, refresh and cache inspection handlers.

use super::connect;
use photoferry::{
    IdentityCache, JsonError, PhotoferryConfig, PhotoferryResult, RefreshMode,
};
use photoferry_storage::{JsonFileStore, identify};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Run `photoferry lookup`.
pub async fn handle_lookup(config: PhotoferryConfig, digest: &str) -> PhotoferryResult<ExitCode> {
    let ferry = connect(config).await?;
    match ferry.lookup_by_identifier(digest).await? {
        Some(remote_ref) => {
            println!("{}", remote_ref);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("not found");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Run `photoferry refresh`.
pub async fn handle_refresh(config: PhotoferryConfig, replace: bool) -> PhotoferryResult<ExitCode> {
    let ferry = connect(config).await?;
    let mode = if replace {
        RefreshMode::Replace
    } else {
        RefreshMode::Merge
    };
    let summary = ferry.refresh_cache(mode).await?;
    println!(
        "{} pages, {} items: {} added, {} reconciled, {} removed",
        summary.pages, summary.seen, summary.added, summary.reconciled, summary.removed
    );
    Ok(ExitCode::SUCCESS)
}

/// Run `photoferry hash`.
pub async fn handle_hash(file: &Path) -> PhotoferryResult<ExitCode> {
    let id = identify(file).await?;
    println!("hex:       {}", id.to_hex());
    println!("base64:    {}", id.to_base64());
    println!("dedup key: {}", id.dedup_key());
    Ok(ExitCode::SUCCESS)
}

/// Run `photoferry cache-stats`. Needs no credentials.
pub async fn handle_cache_stats(config: PhotoferryConfig) -> PhotoferryResult<ExitCode> {
    let path = config.cache().resolved_path();
    let (cache, warning) = IdentityCache::open(Arc::new(JsonFileStore::new(&path))).await;
    if let Some(warning) = warning {
        eprintln!("warning: {}", warning);
    }
    let stats = cache.stats();
    let json = serde_json::to_string_pretty(&stats).map_err(JsonError::from)?;
    println!("{}", path.display());
    println!("{}", json);
    Ok(ExitCode::SUCCESS)
}
