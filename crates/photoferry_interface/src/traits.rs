//! Trait definitions for the remote service and its credentials.

use crate::{MediaPage, UploadSession};
use async_trait::async_trait;
use photoferry_core::{ContentId, RemoteRef};
use photoferry_error::PhotoferryResult;
use photoferry_protocol::{CommitRequest, CommitToken};

/// The remote photo library.
///
/// Every operation is a single attempt. Retrying is the caller's job and
/// is driven by the error's classification.
#[async_trait]
pub trait PhotoService: Send + Sync {
    /// Look up an existing library item by content identity.
    ///
    /// Returns `None` when the library has no such content.
    async fn find_by_content_id(&self, id: &ContentId) -> PhotoferryResult<Option<RemoteRef>>;

    /// Negotiate an upload of `size` bytes.
    async fn begin_upload(&self, id: &ContentId, size: u64) -> PhotoferryResult<UploadSession>;

    /// Send the chunk starting at `offset`.
    ///
    /// The chunk with `last = true` finalizes the transfer and yields the
    /// token needed to commit. Earlier chunks yield `None`.
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Vec<u8>,
        last: bool,
    ) -> PhotoferryResult<Option<CommitToken>>;

    /// Turn a finished transfer into a library item.
    async fn commit(&self, request: &CommitRequest) -> PhotoferryResult<RemoteRef>;

    /// Fetch one page of the library, starting at `page_token` or the
    /// beginning.
    async fn list_media(&self, page_token: Option<&str>) -> PhotoferryResult<MediaPage>;

    /// Short name for logs.
    fn service_name(&self) -> &str {
        "photo-library"
    }
}

/// Source of the bearer token for authenticated requests.
///
/// Session negotiation happens elsewhere; implementations only hand out a
/// token that is valid now.
#[async_trait]
pub trait Credential: Send + Sync {
    /// A currently valid bearer token.
    async fn bearer_token(&self) -> PhotoferryResult<String>;
}

/// A pre-obtained token used as-is.
#[derive(Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    /// Wrap `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Credential for StaticCredential {
    async fn bearer_token(&self) -> PhotoferryResult<String> {
        Ok(self.token.clone())
    }
}
