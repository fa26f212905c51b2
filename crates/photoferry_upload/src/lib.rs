//! Upload pipeline for photoferry.
//!
//! [`Uploader`] resolves one file to a remote reference: from the identity
//! cache, from the service's own dedup check, or by transferring and
//! committing the bytes. [`UploadScheduler`] runs many uploads on a bounded
//! pool of workers and collects one result per file.
//!
//! # Example
//!
//! ```no_run
//! use photoferry_cache::IdentityCache;
//! use photoferry_core::{UploadOptions, UploadTask};
//! use photoferry_interface::PhotoService;
//! use photoferry_upload::{UploadScheduler, Uploader};
//! use std::sync::Arc;
//!
//! # async fn run(service: Arc<dyn PhotoService>) -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(IdentityCache::in_memory());
//! let options = UploadOptions::builder().threads(4usize).build()?;
//! let scheduler = UploadScheduler::new(Uploader::new(service, cache, options));
//! let report = scheduler.run(vec![UploadTask::new("/photos/IMG_0001.jpg")]).await?;
//! println!("{} uploaded, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod progress;
mod retry;
mod scheduler;
mod transfer;
mod uploader;

pub use progress::{NoProgress, ProgressReporter};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
pub use scheduler::UploadScheduler;
pub use transfer::{DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD, TransferConfig, TransferConfigBuilder};
pub use uploader::Uploader;
