//! Value types exchanged across the remote boundary.

use photoferry_core::ContentId;
use serde::{Deserialize, Serialize};

/// One page of the library enumeration.
pub type MediaPage = photoferry_protocol::MediaListResponse;

/// An open upload negotiated with the service.
///
/// Chunks for the same file must all be sent against one session, in
/// offset order.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, Serialize, Deserialize)]
pub struct UploadSession {
    /// Server-issued upload token
    token: String,
    /// Content being uploaded
    content_id: ContentId,
    /// Total number of bytes the service expects
    size: u64,
}

impl UploadSession {
    /// Create a session record from a negotiated token.
    pub fn new(token: impl Into<String>, content_id: ContentId, size: u64) -> Self {
        Self {
            token: token.into(),
            content_id,
            size,
        }
    }
}

/// Remote operations, for logging and call accounting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceCall {
    /// Existence check by content identity
    HashCheck,
    /// Upload token negotiation
    BeginUpload,
    /// One chunk of file data
    UploadChunk,
    /// Finalize an upload into a library item
    Commit,
    /// One page of the library enumeration
    ListMedia,
}
