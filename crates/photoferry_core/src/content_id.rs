//! Content identifiers.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use photoferry_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};

/// Length in bytes of a [`ContentId`].
pub const CONTENT_ID_LEN: usize = 20;

/// SHA-1 digest of a file's full byte content.
///
/// Equality defines "same content": two files with identical bytes share one
/// identifier regardless of name, location or metadata. The remote service
/// addresses content by SHA-1, so the digest doubles as the protocol's
/// existence-check key.
///
/// Three textual forms are supported:
/// - lowercase hex (40 characters), used for display and serialization
/// - standard padded base64 (28 characters)
/// - the dedup key: URL-safe base64 without padding (27 characters)
///
/// # Examples
///
/// ```
/// use photoferry_core::ContentId;
///
/// let hex = "a9993e364706816aba3e25717850c26c9cd0d89d";
/// let id = ContentId::parse(hex).unwrap();
/// assert_eq!(id.to_hex(), hex);
/// assert_eq!(ContentId::parse(&id.to_base64()).unwrap(), id);
/// assert_eq!(ContentId::parse(&id.dedup_key()).unwrap(), id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId([u8; CONTENT_ID_LEN]);

impl ContentId {
    /// Wrap a raw digest.
    pub fn from_bytes(bytes: [u8; CONTENT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Wrap a digest slice, validating its length.
    #[track_caller]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StorageError> {
        let array: [u8; CONTENT_ID_LEN] = bytes.try_into().map_err(|_| {
            StorageError::new(StorageErrorKind::InvalidDigest(format!(
                "expected {} bytes, got {}",
                CONTENT_ID_LEN,
                bytes.len()
            )))
        })?;
        Ok(Self(array))
    }

    /// Parse any supported textual form.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidDigest`] if the text is not hex or
    /// base64, or if it does not decode to exactly 20 bytes.
    #[track_caller]
    pub fn parse(text: &str) -> Result<Self, StorageError> {
        let text = text.trim();
        if text.len() == CONTENT_ID_LEN * 2
            && let Ok(bytes) = hex::decode(text)
        {
            return Self::from_slice(&bytes);
        }

        let decoded = STANDARD
            .decode(text)
            .or_else(|_| URL_SAFE_NO_PAD.decode(text))
            .or_else(|_| URL_SAFE.decode(text))
            .map_err(|_| {
                StorageError::new(StorageErrorKind::InvalidDigest(format!(
                    "'{}' is neither hex nor base64",
                    text
                )))
            })?;
        Self::from_slice(&decoded)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_ID_LEN] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Standard padded base64 form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// URL-safe unpadded base64, the key the service uses to name content.
    pub fn dedup_key(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentId({})", self.to_hex())
    }
}

impl std::str::FromStr for ContentId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.to_hex()
    }
}
