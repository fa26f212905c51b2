//! Photoferry - deduplicating photo library uploader.
//!
//! Photoferry walks a file or directory, identifies each file by content,
//! and uploads only what the photo library does not already hold. A
//! persistent identity cache remembers which content maps to which library
//! item, so repeated runs over the same tree make no transfers.
//!
//! # Quick Start
//!
//! ```no_run
//! use photoferry::{Photoferry, PhotoferryConfig};
//! use photoferry_interface::StaticCredential;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PhotoferryConfig::load()?;
//!     let credential = Arc::new(StaticCredential::new(std::env::var("PHOTOFERRY_TOKEN")?));
//!     let ferry = Photoferry::from_config(config, credential).await?;
//!
//!     let report = ferry.upload("/photos", ferry.request()).await?;
//!     for (path, key) in report.references() {
//!         println!("{} -> {}", path.display(), key);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `photoferry_error` - Error types and failure classification
//! - `photoferry_core` - Content identities, options and results
//! - `photoferry_storage` - Hashing and cache persistence
//! - `photoferry_cache` - The identity cache
//! - `photoferry_protocol` - Wire codec
//! - `photoferry_interface` - The `PhotoService` boundary
//! - `photoferry_client` - HTTP implementation of the boundary
//! - `photoferry_select` - File selection
//! - `photoferry_upload` - Uploader, retry and worker pool
//!
//! This crate adds configuration loading, the facade and the CLI.

mod config;
mod facade;
mod progress;
mod summary;

pub use config::{DEFAULT_CONFIG, PhotoferryConfig, UploadSettings, UploadSettingsBuilder};
pub use facade::{Photoferry, UploadRequest, UploadRequestBuilder};
pub use progress::IndicatifProgress;
pub use summary::{FileSummary, RunSummary};

pub use photoferry_cache::{CacheLoadWarning, CacheStats, IdentityCache, RefreshMode, RefreshSummary};
pub use photoferry_core::*;
pub use photoferry_error::*;
