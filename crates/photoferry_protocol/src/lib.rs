//! Protocol codec for the photo library service.
//!
//! Requests are encoded with [`MessageWriter`] and responses decoded with a
//! strict [`Reader`]. Decoding never returns a partially populated message:
//! malformed input yields a [`DecodeError`](photoferry_error::DecodeError)
//! and nothing else.
//!
//! [`dump`] renders arbitrary payloads as JSON for diagnostics.

#![warn(missing_docs)]

mod dump;
mod request;
mod response;
mod wire;

pub use dump::{DUMP_MAX_DEPTH, dump};
pub use request::{
    CommitRequest, HashCheckRequest, MAX_STRING_FIELD, MediaListRequest, ProtocolRequest,
    UploadTokenRequest, encode,
};
pub use response::{
    CommitResponse, CommitToken, HashCheckResponse, MediaListItem, MediaListResponse,
    ProtocolResponse, decode,
};
pub use wire::{FieldValue, Fields, MAX_FIELD_NUMBER, MessageWriter, Reader, WireType, put_varint};
