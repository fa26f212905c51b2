//! Remote object references.

use photoferry_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};

/// Opaque media key issued by the remote service.
///
/// Returned by fresh uploads and dedup hits alike and cacheable indefinitely.
/// A reference is never empty.
///
/// # Examples
///
/// ```
/// use photoferry_core::RemoteRef;
///
/// let key = RemoteRef::new("AF1QipN-example").unwrap();
/// assert_eq!(key.as_str(), "AF1QipN-example");
/// assert!(RemoteRef::new("").is_err());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteRef(String);

impl RemoteRef {
    /// Wrap a media key, rejecting empty strings.
    #[track_caller]
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidDigest(
                "remote reference must not be empty".to_string(),
            )));
        }
        Ok(Self(key))
    }

    /// The media key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteRef {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteRef> for String {
    fn from(remote: RemoteRef) -> Self {
        remote.0
    }
}

impl AsRef<str> for RemoteRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
