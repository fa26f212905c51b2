//! Error types for the photoferry upload pipeline.
//!
//! This crate provides the foundation error types used throughout the photoferry workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error converts into [`PhotoferryError`], and every [`PhotoferryError`]
//! maps onto exactly one [`FailureClass`], so callers can handle each failure
//! mode of a per-file upload exhaustively.
//!
//! # Examples
//!
//! ```
//! use photoferry_error::{FailureClass, PhotoferryResult, UploadRejected};
//!
//! fn commit() -> PhotoferryResult<String> {
//!     Err(UploadRejected::new("quota exceeded"))?
//! }
//!
//! let err = commit().unwrap_err();
//! assert_eq!(err.class(), FailureClass::Rejected);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod cache;
mod cancelled;
mod class;
mod codec;
mod config;
mod error;
mod internal;
mod json;
mod rejected;
mod storage;
mod transport;

pub use builder::{BuilderError, BuilderErrorKind};
pub use cache::{CacheError, CacheErrorKind};
pub use cancelled::CancelledError;
pub use class::FailureClass;
pub use codec::{DECODE_PREFIX_LIMIT, DecodeError, EncodeError};
pub use config::ConfigError;
pub use error::{PhotoferryError, PhotoferryErrorKind, PhotoferryResult};
pub use internal::InternalError;
pub use json::JsonError;
pub use rejected::UploadRejected;
pub use storage::{StorageError, StorageErrorKind};
pub use transport::{RetryableError, TransportError, TransportErrorKind};
