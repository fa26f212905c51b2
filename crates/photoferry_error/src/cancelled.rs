//! Cancellation error.

/// A task was not run because its scheduler run was cancelled.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cancelled: {} at line {} in {}", message, line, file)]
pub struct CancelledError {
    /// What was cancelled
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CancelledError {
    /// Create a new cancellation error at the current location.
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
