//! Internal failure error.

/// A worker failed in a way that is not attributable to the file or service.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Internal Error: {} at line {} in {}", message, line, file)]
pub struct InternalError {
    /// What failed
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl InternalError {
    /// Create a new internal error at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
