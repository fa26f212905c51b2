//! Content identity computation.

use photoferry_core::ContentId;
use photoferry_error::{PhotoferryResult, StorageError};
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read size used while hashing a file.
pub const IDENTIFY_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the content identity of a file.
///
/// The digest covers the full byte stream and nothing else, so name, mtime
/// and permissions never influence the result.
///
/// # Errors
///
/// Returns a [`StorageError`] with `NotFound` for a missing file and
/// `FileRead` for any other read failure.
#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub async fn identify(path: &Path) -> PhotoferryResult<ContentId> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::from_io(path, &e))?;

    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; IDENTIFY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| StorageError::from_io(path, &e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    let id = ContentId::from_bytes(hasher.finalize().into());
    tracing::debug!(content_id = %id, bytes = total, "Identified file");
    Ok(id)
}

/// Source of content identities for files about to be uploaded.
#[async_trait::async_trait]
pub trait ContentIdentifier: Send + Sync {
    /// Identity of the bytes at `path`.
    async fn identify(&self, path: &Path) -> PhotoferryResult<ContentId>;
}

/// Hashes the file on disk with [`identify`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileIdentifier;

#[async_trait::async_trait]
impl ContentIdentifier for FileIdentifier {
    async fn identify(&self, path: &Path) -> PhotoferryResult<ContentId> {
        identify(path).await
    }
}

/// Compute the content identity of an in-memory buffer.
pub fn identify_bytes(data: &[u8]) -> ContentId {
    ContentId::from_bytes(Sha1::digest(data).into())
}

/// Accept a caller-trusted digest for `path` without reading the file.
///
/// Only the digest's format is validated; the file content is not rehashed.
///
/// # Errors
///
/// Returns `InvalidDigest` when the text is not a 20-byte digest in hex or
/// base64 form.
#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub fn accept_digest(path: &Path, digest: &str) -> PhotoferryResult<ContentId> {
    let id = ContentId::parse(digest)?;
    tracing::debug!(content_id = %id, "Accepted precomputed digest");
    Ok(id)
}
