//! Exhaustive failure classification.

/// The failure mode of a single upload, derived from a [`crate::PhotoferryError`].
///
/// Every error in the workspace maps onto exactly one class. Only
/// [`FailureClass::Transient`] is retried by the uploader.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum FailureClass {
    /// A response payload could not be parsed
    #[display("decode")]
    Decode,
    /// A request could not be constructed
    #[display("encode")]
    Encode,
    /// The service explicitly declined the upload
    #[display("rejected")]
    Rejected,
    /// Local read or network failure, eligible for retry
    #[display("transient")]
    Transient,
    /// Persisted cache state could not be used
    #[display("cache_corruption")]
    CacheCorruption,
    /// Invalid configuration or input, fatal before scheduling
    #[display("config")]
    Config,
    /// The run was cancelled before the task completed
    #[display("cancelled")]
    Cancelled,
    /// Anything else, including panicked workers
    #[display("internal")]
    Internal,
}

impl FailureClass {
    /// Whether failures of this class are retried.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::Transient)
    }
}
