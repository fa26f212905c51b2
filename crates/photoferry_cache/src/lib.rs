//! Persistent content identity cache for photoferry.
//!
//! Maps [`ContentId`](photoferry_core::ContentId) to the remote reference of
//! the stored object. The cache survives restarts through a
//! [`CacheStore`](photoferry_storage::CacheStore), degrades to empty on
//! corrupt state, and can be refreshed from an authoritative enumeration of
//! the remote library.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod claim;
mod config;
mod document;
mod refresh;

pub use cache::{CacheLoadWarning, CacheStats, IdentityCache, InsertOutcome};
pub use claim::ClaimGuard;
pub use config::{IdentityCacheConfig, IdentityCacheConfigBuilder};
pub use document::CACHE_DOCUMENT_VERSION;
pub use refresh::{RefreshMode, RefreshSummary, RemoteItem, RemotePage, RemoteSource};
