//! Inbound response decoders.
//!
//! Decoding is all-or-nothing: a response either decodes completely or
//! fails with a [`DecodeError`] carrying a bounded prefix of the payload.

use crate::wire::{Fields, Reader};
use photoferry_core::{CONTENT_ID_LEN, ContentId, RemoteRef};
use photoferry_error::{DecodeError, PhotoferryResult, UploadRejected};
use photoferry_storage::MediaKind;

/// An inbound protocol message.
pub trait ProtocolResponse: Sized {
    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// Returns a decode error for malformed payloads, and an
    /// [`UploadRejected`] where a well-formed response denies the request.
    fn decode(bytes: &[u8]) -> PhotoferryResult<Self>;
}

/// Decode any response.
pub fn decode<R: ProtocolResponse>(bytes: &[u8]) -> PhotoferryResult<R> {
    R::decode(bytes)
}

fn media_key<'a>(
    reader: &Reader<'a>,
    fields: &Fields<'a>,
    field: u32,
) -> Result<Option<RemoteRef>, DecodeError> {
    Ok(reader
        .string(fields, field)?
        .and_then(|key| RemoteRef::new(key).ok()))
}

/// Result of an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCheckResponse {
    /// Media key of the matching library item, if any
    pub media_key: Option<RemoteRef>,
}

impl ProtocolResponse for HashCheckResponse {
    fn decode(bytes: &[u8]) -> PhotoferryResult<Self> {
        let reader = Reader::new(bytes);
        let root = reader.parse_root()?;

        let Some(body) = reader.message(&root, 1)? else {
            return Ok(Self { media_key: None });
        };
        let Some(matches) = reader.message(&body, 2)? else {
            return Ok(Self { media_key: None });
        };
        let Some(item) = reader.message(&matches, 2)? else {
            return Ok(Self { media_key: None });
        };
        Ok(Self {
            media_key: media_key(&reader, &item, 1)?,
        })
    }
}

/// Token returned by the final upload chunk, consumed by the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitToken {
    /// Server-side upload identifier
    pub upload_id: u64,
    /// Opaque blob echoed back in the commit
    pub blob: Vec<u8>,
}

impl ProtocolResponse for CommitToken {
    fn decode(bytes: &[u8]) -> PhotoferryResult<Self> {
        let reader = Reader::new(bytes);
        let root = reader.parse_root()?;
        let upload_id = reader
            .varint(&root, 1)?
            .ok_or_else(|| reader.error("commit token missing upload id (field 1)"))?;
        let blob = reader
            .bytes(&root, 2)?
            .ok_or_else(|| reader.error("commit token missing blob (field 2)"))?;
        Ok(Self {
            upload_id,
            blob: blob.to_vec(),
        })
    }
}

/// Result of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResponse {
    /// Media key of the new library item
    pub media_key: RemoteRef,
}

impl ProtocolResponse for CommitResponse {
    fn decode(bytes: &[u8]) -> PhotoferryResult<Self> {
        let reader = Reader::new(bytes);
        let root = reader.parse_root()?;

        let Some(body) = reader.message(&root, 1)? else {
            return Err(UploadRejected::new("invalid response structure").into());
        };
        let reason = reader.string(&body, 5)?.filter(|r| !r.is_empty());
        let Some(created) = reader.message(&body, 3)? else {
            let reason = reason.unwrap_or("invalid response structure");
            return Err(UploadRejected::new(reason).into());
        };
        match media_key(&reader, &created, 1)? {
            Some(media_key) => Ok(Self { media_key }),
            None => {
                let reason = reason.unwrap_or("no media key returned");
                Err(UploadRejected::new(reason).into())
            }
        }
    }
}

/// One library item from an enumeration page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaListItem {
    /// Media key
    pub media_key: RemoteRef,
    /// Name in the library
    pub file_name: Option<String>,
    /// Content identity, when the service reported a usable hash
    pub content_id: Option<ContentId>,
    /// Photo or video
    pub kind: Option<MediaKind>,
}

/// One page of the library enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaListResponse {
    /// Continuation token; `None` on the last page
    pub next_page_token: Option<String>,
    /// Items on this page
    pub items: Vec<MediaListItem>,
    /// Library state token
    pub state_token: Option<String>,
}

fn content_hash(raw: &[u8]) -> Option<ContentId> {
    if raw.len() == CONTENT_ID_LEN {
        return ContentId::from_slice(raw).ok();
    }
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| ContentId::parse(text).ok())
}

impl ProtocolResponse for MediaListResponse {
    fn decode(bytes: &[u8]) -> PhotoferryResult<Self> {
        let reader = Reader::new(bytes);
        let root = reader.parse_root()?;
        let Some(body) = reader.message(&root, 1)? else {
            return Ok(Self::default());
        };

        let mut items = Vec::new();
        for item in reader.messages(&body, 2)? {
            let Some(media_key) = media_key(&reader, &item, 1)? else {
                continue;
            };
            let file_name = match reader.message(&item, 2)? {
                Some(meta) => reader.string(&meta, 4)?.map(str::to_string),
                None => None,
            };
            let content_id = reader.bytes(&item, 3)?.and_then(content_hash);
            let kind = reader.varint(&item, 5)?.and_then(MediaKind::from_wire);
            items.push(MediaListItem {
                media_key,
                file_name,
                content_id,
                kind,
            });
        }

        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Self {
            next_page_token: non_empty(reader.string(&body, 1)?),
            items,
            state_token: non_empty(reader.string(&body, 6)?),
        })
    }
}
