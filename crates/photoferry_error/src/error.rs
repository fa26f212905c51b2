//! Top-level error wrapper types.

use crate::{
    BuilderError, CacheError, CancelledError, ConfigError, DecodeError, EncodeError, FailureClass,
    InternalError, JsonError, RetryableError, StorageError, StorageErrorKind, TransportError, UploadRejected,
};

/// Every failure the photoferry pipeline can report.
///
/// # Examples
///
/// ```
/// use photoferry_error::{EncodeError, PhotoferryError, PhotoferryErrorKind};
///
/// let err: PhotoferryError = EncodeError::new("file_name", "must not be empty").into();
/// assert!(matches!(err.kind(), PhotoferryErrorKind::Encode(_)));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PhotoferryErrorKind {
    /// Response bytes could not be parsed
    #[from(DecodeError)]
    Decode(DecodeError),
    /// Request could not be encoded
    #[from(EncodeError)]
    Encode(EncodeError),
    /// Service declined the upload
    #[from(UploadRejected)]
    Rejected(UploadRejected),
    /// Network or transfer failure
    #[from(TransportError)]
    Transport(TransportError),
    /// Identity cache failure
    #[from(CacheError)]
    Cache(CacheError),
    /// Local file or store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Run was cancelled
    #[from(CancelledError)]
    Cancelled(CancelledError),
    /// Worker failure unrelated to the file
    #[from(InternalError)]
    Internal(InternalError),
}

/// Photoferry error with kind discrimination.
///
/// # Examples
///
/// ```
/// use photoferry_error::{ConfigError, FailureClass, PhotoferryResult};
///
/// fn might_fail() -> PhotoferryResult<()> {
///     Err(ConfigError::new("target does not exist"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert_eq!(err.class(), FailureClass::Config);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Photoferry Error: {}", _0)]
pub struct PhotoferryError(Box<PhotoferryErrorKind>);

impl PhotoferryError {
    /// Create a new error from a kind.
    pub fn new(kind: PhotoferryErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PhotoferryErrorKind {
        &self.0
    }

    /// Classify this error into its failure mode.
    pub fn class(&self) -> FailureClass {
        match self.kind() {
            PhotoferryErrorKind::Decode(_) => FailureClass::Decode,
            PhotoferryErrorKind::Encode(_) => FailureClass::Encode,
            PhotoferryErrorKind::Rejected(_) => FailureClass::Rejected,
            PhotoferryErrorKind::Transport(e) if e.is_retryable() => FailureClass::Transient,
            PhotoferryErrorKind::Transport(_) => FailureClass::Internal,
            PhotoferryErrorKind::Cache(_) => FailureClass::CacheCorruption,
            PhotoferryErrorKind::Storage(e) => match e.kind {
                StorageErrorKind::FileRead(_) => FailureClass::Transient,
                StorageErrorKind::NotFound(_) | StorageErrorKind::InvalidDigest(_) => {
                    FailureClass::Config
                }
                StorageErrorKind::FileWrite(_) | StorageErrorKind::DirectoryCreation(_) => {
                    FailureClass::Internal
                }
            },
            PhotoferryErrorKind::Config(_) | PhotoferryErrorKind::Builder(_) => {
                FailureClass::Config
            }
            PhotoferryErrorKind::Json(_) => FailureClass::Internal,
            PhotoferryErrorKind::Cancelled(_) => FailureClass::Cancelled,
            PhotoferryErrorKind::Internal(_) => FailureClass::Internal,
        }
    }
}

impl RetryableError for PhotoferryError {
    fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }
}

// Generic From implementation for any type that converts to PhotoferryErrorKind
impl<T> From<T> for PhotoferryError
where
    T: Into<PhotoferryErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for photoferry operations.
pub type PhotoferryResult<T> = std::result::Result<T, PhotoferryError>;
