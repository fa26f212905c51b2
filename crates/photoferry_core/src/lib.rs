//! Core data types for the photoferry upload pipeline.
//!
//! This crate provides the value types shared by every stage of an upload
//! run: content identities, remote references, cache entries, per-run
//! options and per-file results.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content_id;
mod device;
mod entry;
mod filter;
mod options;
mod outcome;
mod remote_ref;
mod task;

pub use content_id::{CONTENT_ID_LEN, ContentId};
pub use device::DeviceProfile;
pub use entry::{CacheEntry, CacheOrigin};
pub use filter::{FilterOptions, FilterOptionsBuilder};
pub use options::{QualityTier, UploadOptions, UploadOptionsBuilder};
pub use outcome::{UploadOutcome, UploadReport, UploadResult, UploadSuccess};
pub use remote_ref::RemoteRef;
pub use task::UploadTask;
