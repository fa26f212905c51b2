//! Upload rejection error.

/// The remote service explicitly declined an upload.
///
/// Terminal for the affected file; sibling uploads continue.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Upload Rejected: {} at line {} in {}", reason, line, file)]
pub struct UploadRejected {
    /// Server-provided reason
    pub reason: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UploadRejected {
    /// Create a new rejection with the server-provided reason.
    #[track_caller]
    pub fn new(reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
