//! Whole-body and chunked file transfer.

use photoferry_error::{
    ConfigError, DecodeError, PhotoferryResult, TransportError, TransportErrorKind,
};
use photoferry_interface::{PhotoService, UploadSession};
use photoferry_protocol::CommitToken;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// 8 MiB
pub const DEFAULT_CHUNK_THRESHOLD: u64 = 8 * 1024 * 1024;

/// 4 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

fn default_chunk_threshold() -> u64 {
    DEFAULT_CHUNK_THRESHOLD
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// When and how files are split into chunks.
///
/// Files no larger than `chunk_threshold` go up in a single request.
/// Larger files are streamed in `chunk_size` pieces.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(
    default,
    setter(into),
    build_fn(validate = "Self::validate", error = "photoferry_error::BuilderError")
)]
pub struct TransferConfig {
    /// Largest file sent as one body
    #[serde(default = "default_chunk_threshold")]
    chunk_threshold: u64,

    /// Piece size for chunked transfer
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: default_chunk_threshold(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl TransferConfig {
    /// Start a builder.
    pub fn builder() -> TransferConfigBuilder {
        TransferConfigBuilder::default()
    }

    /// Check that the configuration can drive a transfer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `chunk_size` is zero.
    pub fn validate(&self) -> PhotoferryResult<()> {
        if self.chunk_size == 0 {
            return Err(ConfigError::new("chunk_size must be greater than zero").into());
        }
        Ok(())
    }
}

impl TransferConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.chunk_size {
            Some(0) => Err("chunk_size must be greater than zero".to_string()),
            _ => Ok(()),
        }
    }
}

fn read_failure(path: &Path, e: std::io::Error) -> TransportError {
    TransportError::new(TransportErrorKind::FileRead(format!(
        "{}: {}",
        path.display(),
        e
    )))
}

/// Send the file at `path` through `session` and return the commit token.
///
/// Local read failures are reported as retryable transport errors, since a
/// retry restarts the whole transfer.
pub(crate) async fn send_file(
    service: &dyn PhotoService,
    session: &UploadSession,
    path: &Path,
    config: &TransferConfig,
) -> PhotoferryResult<CommitToken> {
    let size = *session.size();

    if size <= config.chunk_threshold {
        let data = tokio::fs::read(path).await.map_err(|e| read_failure(path, e))?;
        if data.len() as u64 != size {
            return Err(TransportError::new(TransportErrorKind::FileRead(format!(
                "{} changed size during upload ({} bytes, expected {})",
                path.display(),
                data.len(),
                size
            )))
            .into());
        }
        return finalized(service.upload_chunk(session, 0, data, true).await?);
    }

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| read_failure(path, e))?;
    let mut offset = 0u64;
    loop {
        let remaining = size - offset;
        let len = remaining.min(config.chunk_size as u64) as usize;
        let mut chunk = vec![0u8; len];
        file.read_exact(&mut chunk)
            .await
            .map_err(|e| read_failure(path, e))?;

        let last = offset + len as u64 >= size;
        tracing::debug!(offset, len, last, "Sending chunk");
        let token = service.upload_chunk(session, offset, chunk, last).await?;
        offset += len as u64;
        if last {
            return finalized(token);
        }
    }
}

fn finalized(token: Option<CommitToken>) -> PhotoferryResult<CommitToken> {
    token.ok_or_else(|| DecodeError::new("final chunk returned no commit token", &[]).into())
}
