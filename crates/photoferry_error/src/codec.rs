//! Protocol codec error types.

/// Maximum number of payload bytes retained by a [`DecodeError`].
pub const DECODE_PREFIX_LIMIT: usize = 64;

/// A response payload could not be parsed.
///
/// Carries the payload length and a bounded prefix of the raw bytes for
/// diagnosis. Decode failures indicate a protocol or version mismatch and are
/// never retried.
///
/// # Examples
///
/// ```
/// use photoferry_error::{DecodeError, DECODE_PREFIX_LIMIT};
///
/// let payload = vec![0xffu8; 200];
/// let err = DecodeError::new("truncated varint", &payload);
/// assert_eq!(err.payload_len, 200);
/// assert_eq!(err.payload_prefix.len(), DECODE_PREFIX_LIMIT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct DecodeError {
    /// What went wrong
    pub reason: String,
    /// Full length of the rejected payload
    pub payload_len: usize,
    /// First bytes of the rejected payload, at most [`DECODE_PREFIX_LIMIT`]
    pub payload_prefix: Vec<u8>,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DecodeError {
    /// Create a new decode error, retaining a bounded prefix of `payload`.
    #[track_caller]
    pub fn new(reason: impl Into<String>, payload: &[u8]) -> Self {
        let location = std::panic::Location::caller();
        let keep = payload.len().min(DECODE_PREFIX_LIMIT);
        Self {
            reason: reason.into(),
            payload_len: payload.len(),
            payload_prefix: payload[..keep].to_vec(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decode Error: {} ({} bytes, prefix {}) at line {} in {}",
            self.reason,
            self.payload_len,
            hex::encode(&self.payload_prefix),
            self.line,
            self.file
        )
    }
}

/// An outbound request could not be constructed from its inputs.
///
/// # Examples
///
/// ```
/// use photoferry_error::EncodeError;
///
/// let err = EncodeError::new("file_name", "must not be empty");
/// assert!(format!("{}", err).contains("file_name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Encode Error: field '{}' {} at line {} in {}", field, reason, line, file)]
pub struct EncodeError {
    /// The request field that was rejected
    pub field: String,
    /// Why the value cannot be encoded
    pub reason: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl EncodeError {
    /// Create a new encode error with automatic location tracking.
    #[track_caller]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
