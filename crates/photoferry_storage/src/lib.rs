//! Content identification and durable storage for photoferry.
//!
//! This crate computes the SHA-1 identity of local files and provides the
//! persistence boundary for the identity cache.
//!
//! # Features
//!
//! - **Streaming identification**: files are hashed in fixed-size reads, never loaded whole
//! - **Digest acceptance**: caller-trusted digests in hex or base64 skip the read
//! - **Atomic persistence**: [`JsonFileStore`] writes a temp file and renames it into place
//!
//! # Example
//!
//! ```rust
//! use photoferry_storage::{identify, identify_bytes};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("a.jpg");
//! std::fs::write(&path, b"abc")?;
//!
//! let id = identify(&path).await?;
//! assert_eq!(id, identify_bytes(b"abc"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod identify;
mod media_type;
mod store;

pub use filesystem::JsonFileStore;
pub use identify::{
    ContentIdentifier, FileIdentifier, IDENTIFY_BUFFER_SIZE, accept_digest, identify,
    identify_bytes,
};
pub use media_type::MediaKind;
pub use photoferry_error::{StorageError, StorageErrorKind};
pub use store::{CacheStore, MemoryStore};
