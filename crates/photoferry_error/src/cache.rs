//! Identity cache error types.

/// Kinds of identity cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Persisted state exists but cannot be interpreted
    #[display("Cache state corrupted: {}", _0)]
    Corrupted(String),
    /// Persisted state could not be read
    #[display("Failed to read cache: {}", _0)]
    Read(String),
    /// Cache state could not be written
    #[display("Failed to write cache: {}", _0)]
    Write(String),
}

/// Identity cache error with location tracking.
///
/// # Examples
///
/// ```
/// use photoferry_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::Corrupted("unexpected EOF".to_string()));
/// assert!(format!("{}", err).contains("corrupted"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
