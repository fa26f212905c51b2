//! Identity cache entries.

use crate::RemoteRef;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How a cache entry came to be known.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum CacheOrigin {
    /// Committed by a transfer from this client
    #[display("uploaded")]
    Uploaded,
    /// Confirmed by the service's existence check
    #[display("server_dedup")]
    ServerDedup,
    /// Picked up from a bulk enumeration of the library
    #[display("refresh")]
    Refresh,
}

/// The remote reference stored for one content identifier.
///
/// # Examples
///
/// ```
/// use photoferry_core::{CacheEntry, CacheOrigin, RemoteRef};
///
/// let entry = CacheEntry::new(RemoteRef::new("key-1").unwrap(), CacheOrigin::Uploaded);
/// assert_eq!(entry.remote_ref().as_str(), "key-1");
/// assert_eq!(*entry.origin(), CacheOrigin::Uploaded);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CacheEntry {
    remote_ref: RemoteRef,
    origin: CacheOrigin,
    recorded_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry recorded now.
    pub fn new(remote_ref: RemoteRef, origin: CacheOrigin) -> Self {
        Self {
            remote_ref,
            origin,
            recorded_at: Utc::now(),
        }
    }

    /// Create an entry with an explicit timestamp.
    pub fn recorded(remote_ref: RemoteRef, origin: CacheOrigin, recorded_at: DateTime<Utc>) -> Self {
        Self {
            remote_ref,
            origin,
            recorded_at,
        }
    }
}
