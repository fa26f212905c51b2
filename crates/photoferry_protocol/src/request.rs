//! Outbound request encoders.

use crate::wire::MessageWriter;
use crate::CommitToken;
use photoferry_core::{ContentId, DeviceProfile, QualityTier};
use photoferry_error::EncodeError;

/// Longest string or bytes field a request may carry.
pub const MAX_STRING_FIELD: usize = 4096;

/// Unknown constant the service expects next to the commit timestamp.
const COMMIT_TIMESTAMP_COMPANION: u64 = 46_000_000;

/// An outbound protocol message.
pub trait ProtocolRequest {
    /// Encode to wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when a field value cannot be represented.
    fn encode(&self) -> Result<Vec<u8>, EncodeError>;
}

/// Encode any request.
pub fn encode<R: ProtocolRequest>(request: &R) -> Result<Vec<u8>, EncodeError> {
    request.encode()
}

/// Existence check for content already in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCheckRequest {
    /// Content to look for
    pub content_id: ContentId,
}

impl ProtocolRequest for HashCheckRequest {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut hash = MessageWriter::new();
        hash.bytes(1, self.content_id.as_bytes());
        let mut body = MessageWriter::new();
        body.message(1, hash).message(2, MessageWriter::new());
        let mut root = MessageWriter::new();
        root.message(1, body);
        Ok(root.finish())
    }
}

/// Request for an upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTokenRequest {
    /// Total size of the file to upload
    pub file_size: u64,
}

impl ProtocolRequest for UploadTokenRequest {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.file_size == 0 {
            return Err(EncodeError::new("file_size", "must be greater than zero"));
        }
        if self.file_size > i64::MAX as u64 {
            return Err(EncodeError::new(
                "file_size",
                format!("{} exceeds the signed 64-bit range", self.file_size),
            ));
        }
        let mut root = MessageWriter::new();
        root.varint(1, 2)
            .varint(2, 2)
            .varint(3, 1)
            .varint(4, 3)
            .varint(7, self.file_size);
        Ok(root.finish())
    }
}

/// Finalize an uploaded blob into a library item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    /// Token returned by the final chunk
    pub commit_token: CommitToken,
    /// Name shown in the library
    pub file_name: String,
    /// Identity of the uploaded content
    pub content_id: ContentId,
    /// Modification time in Unix seconds
    pub modified_at: i64,
    /// Requested storage quality
    pub quality: QualityTier,
    /// Device the commit claims to come from
    pub device: DeviceProfile,
}

impl ProtocolRequest for CommitRequest {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.file_name.is_empty() {
            return Err(EncodeError::new("file_name", "must not be empty"));
        }
        if self.file_name.len() > MAX_STRING_FIELD {
            return Err(EncodeError::new(
                "file_name",
                format!(
                    "is {} bytes, limit is {}",
                    self.file_name.len(),
                    MAX_STRING_FIELD
                ),
            ));
        }
        if self.commit_token.blob.is_empty() {
            return Err(EncodeError::new("commit_token", "blob must not be empty"));
        }

        let mut token = MessageWriter::new();
        token
            .varint(1, self.commit_token.upload_id)
            .bytes(2, &self.commit_token.blob);

        let mut timestamp = MessageWriter::new();
        timestamp
            .int64(1, self.modified_at)
            .varint(2, COMMIT_TIMESTAMP_COMPANION);

        let mut item = MessageWriter::new();
        item.message(1, token)
            .string(2, &self.file_name)
            .bytes(3, self.content_id.as_bytes())
            .message(4, timestamp)
            .varint(7, self.quality.wire_value())
            .varint(10, 1);

        let mut device = MessageWriter::new();
        device
            .string(3, self.device.model())
            .string(4, self.device.make())
            .varint(5, *self.device.android_api_version());

        let mut root = MessageWriter::new();
        root.message(1, item)
            .message(2, device)
            .bytes(3, &[1, 3]);
        Ok(root.finish())
    }
}

/// One page of the library enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaListRequest {
    /// Continuation token from the previous page
    pub page_token: Option<String>,
    /// Page size hint; zero lets the service choose
    pub limit: u32,
}

const MEDIA_METADATA_FIELDS: &[u32] = &[
    1, 3, 4, 5, 6, 7, 15, 16, 17, 19, 20, 21, 25, 30, 31, 32, 33, 34, 36, 37, 38, 39, 40, 41,
];

const ALBUM_OPTION_FIELDS: &[u32] = &[
    2, 3, 7, 8, 14, 16, 17, 18, 19, 20, 21, 22, 23, 27, 29, 30, 31, 32, 34, 37, 38, 39, 41,
];

impl ProtocolRequest for MediaListRequest {
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut selector = MessageWriter::new();

        let mut metadata = MessageWriter::new();
        metadata.empty_messages(MEDIA_METADATA_FIELDS);
        selector.message(1, metadata);

        if self.limit > 0 {
            selector.varint(2, u64::from(self.limit));
        }

        let mut albums = MessageWriter::new();
        albums.empty_messages(ALBUM_OPTION_FIELDS);
        selector.message(3, albums);

        if let Some(token) = self.page_token.as_deref().filter(|t| !t.is_empty()) {
            if token.len() > MAX_STRING_FIELD {
                return Err(EncodeError::new(
                    "page_token",
                    format!("is {} bytes, limit is {}", token.len(), MAX_STRING_FIELD),
                ));
            }
            selector.string(4, token);
        }

        let mut options = MessageWriter::new();
        options.varint(1, 2);
        selector.varint(7, 2).varint(11, 1).varint(11, 2).message(22, options);

        let mut innermost = MessageWriter::new();
        innermost.message(1, MessageWriter::new());
        let mut inner = MessageWriter::new();
        inner.message(1, innermost).message(2, MessageWriter::new());
        let mut tree = MessageWriter::new();
        tree.message(1, inner);
        let mut extra = MessageWriter::new();
        extra.message(1, tree).message(2, MessageWriter::new());

        let mut root = MessageWriter::new();
        root.message(1, selector).message(2, extra);
        Ok(root.finish())
    }
}
