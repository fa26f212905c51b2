use photoferry_core::{ContentId, DeviceProfile, QualityTier};
use photoferry_error::{DECODE_PREFIX_LIMIT, FailureClass, PhotoferryErrorKind};
use photoferry_protocol::{
    CommitRequest, CommitResponse, CommitToken, HashCheckRequest, HashCheckResponse,
    MediaListRequest, MediaListResponse, MessageWriter, Reader, UploadTokenRequest, decode,
    encode,
};
use photoferry_storage::MediaKind;

fn commit_response(media_key: Option<&str>, reason: Option<&str>) -> Vec<u8> {
    let mut created = MessageWriter::new();
    if let Some(key) = media_key {
        created.string(1, key);
    }
    let mut body = MessageWriter::new();
    body.message(3, created);
    if let Some(reason) = reason {
        body.string(5, reason);
    }
    let mut root = MessageWriter::new();
    root.message(1, body);
    root.finish()
}

fn sample_commit() -> CommitRequest {
    CommitRequest {
        commit_token: CommitToken {
            upload_id: 77,
            blob: vec![1, 2, 3],
        },
        file_name: "IMG_0001.jpg".to_string(),
        content_id: ContentId::from_bytes([0xab; 20]),
        modified_at: 1_700_000_000,
        quality: QualityTier::Original,
        device: DeviceProfile::default(),
    }
}

#[test]
fn test_hash_check_request_layout() {
    let id = ContentId::from_bytes([7; 20]);
    let bytes = encode(&HashCheckRequest { content_id: id }).unwrap();

    let reader = Reader::new(&bytes);
    let root = reader.parse_root().unwrap();
    let body = reader.message(&root, 1).unwrap().unwrap();
    let hash = reader.message(&body, 1).unwrap().unwrap();
    assert_eq!(reader.bytes(&hash, 1).unwrap(), Some(&[7u8; 20][..]));
    assert!(reader.message(&body, 2).unwrap().unwrap().is_empty());
}

#[test]
fn test_hash_check_response_found_and_absent() {
    let mut item = MessageWriter::new();
    item.string(1, "AF1QipExisting");
    let mut matches = MessageWriter::new();
    matches.message(2, item);
    let mut body = MessageWriter::new();
    body.message(2, matches);
    let mut root = MessageWriter::new();
    root.message(1, body);

    let found: HashCheckResponse = decode(&root.finish()).unwrap();
    assert_eq!(
        found.media_key.map(|k| k.as_str().to_string()),
        Some("AF1QipExisting".to_string())
    );

    let mut empty_body = MessageWriter::new();
    empty_body.varint(9, 1);
    let mut root = MessageWriter::new();
    root.message(1, empty_body);
    let absent: HashCheckResponse = decode(&root.finish()).unwrap();
    assert!(absent.media_key.is_none());
}

#[test]
fn test_upload_token_request_rejects_zero_size() {
    let err = encode(&UploadTokenRequest { file_size: 0 }).unwrap_err();
    assert_eq!(err.field, "file_size");

    let err = encode(&UploadTokenRequest { file_size: u64::MAX }).unwrap_err();
    assert_eq!(err.field, "file_size");

    assert!(encode(&UploadTokenRequest { file_size: 1024 }).is_ok());
}

#[test]
fn test_commit_request_layout() {
    let request = sample_commit();
    let bytes = encode(&request).unwrap();

    let reader = Reader::new(&bytes);
    let root = reader.parse_root().unwrap();
    let item = reader.message(&root, 1).unwrap().unwrap();
    let token = reader.message(&item, 1).unwrap().unwrap();
    assert_eq!(reader.varint(&token, 1).unwrap(), Some(77));
    assert_eq!(reader.bytes(&token, 2).unwrap(), Some(&[1u8, 2, 3][..]));
    assert_eq!(reader.string(&item, 2).unwrap(), Some("IMG_0001.jpg"));
    assert_eq!(reader.bytes(&item, 3).unwrap(), Some(&[0xabu8; 20][..]));
    assert_eq!(reader.varint(&item, 7).unwrap(), Some(3));

    let timestamp = reader.message(&item, 4).unwrap().unwrap();
    assert_eq!(reader.varint(&timestamp, 1).unwrap(), Some(1_700_000_000));

    let device = reader.message(&root, 2).unwrap().unwrap();
    assert_eq!(reader.string(&device, 3).unwrap(), Some("Pixel XL"));
    assert_eq!(reader.string(&device, 4).unwrap(), Some("Google"));
    assert_eq!(reader.varint(&device, 5).unwrap(), Some(28));
}

#[test]
fn test_commit_request_saver_quality() {
    let request = CommitRequest {
        quality: QualityTier::Saver,
        ..sample_commit()
    };
    let bytes = encode(&request).unwrap();
    let reader = Reader::new(&bytes);
    let root = reader.parse_root().unwrap();
    let item = reader.message(&root, 1).unwrap().unwrap();
    assert_eq!(reader.varint(&item, 7).unwrap(), Some(1));
}

#[test]
fn test_commit_request_rejects_bad_name() {
    let empty = CommitRequest {
        file_name: String::new(),
        ..sample_commit()
    };
    assert_eq!(encode(&empty).unwrap_err().field, "file_name");

    let long = CommitRequest {
        file_name: "a".repeat(5000),
        ..sample_commit()
    };
    assert_eq!(encode(&long).unwrap_err().field, "file_name");
}

#[test]
fn test_commit_response_success() {
    let response: CommitResponse = decode(&commit_response(Some("AF1QipNew"), None)).unwrap();
    assert_eq!(response.media_key.as_str(), "AF1QipNew");
}

#[test]
fn test_commit_response_without_key_is_rejected_not_decode_error() {
    let err = decode::<CommitResponse>(&commit_response(None, Some("quota exceeded"))).unwrap_err();
    match err.kind() {
        PhotoferryErrorKind::Rejected(rejected) => assert_eq!(rejected.reason, "quota exceeded"),
        other => panic!("expected rejection, got {other}"),
    }
    assert_eq!(err.class(), FailureClass::Rejected);

    let err = decode::<CommitResponse>(&commit_response(None, None)).unwrap_err();
    match err.kind() {
        PhotoferryErrorKind::Rejected(rejected) => {
            assert_eq!(rejected.reason, "no media key returned")
        }
        other => panic!("expected rejection, got {other}"),
    }
}

#[test]
fn test_commit_response_missing_body_is_rejected() {
    let err = decode::<CommitResponse>(&[]).unwrap_err();
    assert_eq!(err.class(), FailureClass::Rejected);
}

#[test]
fn test_truncated_payload_is_decode_error() {
    let full = commit_response(Some("AF1QipNew"), None);
    for cut in 1..full.len() {
        let err = decode::<CommitResponse>(&full[..cut]).unwrap_err();
        assert_eq!(err.class(), FailureClass::Decode, "cut at {cut}");
    }
}

#[test]
fn test_wrong_wire_type_is_decode_error() {
    // field 1 as a varint where a nested message is expected
    let mut root = MessageWriter::new();
    root.varint(1, 5);
    let err = decode::<HashCheckResponse>(&root.finish()).unwrap_err();
    match err.kind() {
        PhotoferryErrorKind::Decode(e) => assert!(e.reason.contains("expected")),
        other => panic!("expected decode error, got {other}"),
    }
}

#[test]
fn test_decode_error_keeps_bounded_prefix() {
    let mut payload = vec![0x0a, 0xc8, 0x01];
    payload.extend(std::iter::repeat_n(0u8, 100));
    // length prefix 200 exceeds the 100 bytes that follow
    let err = decode::<MediaListResponse>(&payload).unwrap_err();
    match err.kind() {
        PhotoferryErrorKind::Decode(e) => {
            assert_eq!(e.payload_len, payload.len());
            assert_eq!(e.payload_prefix.len(), DECODE_PREFIX_LIMIT);
            assert_eq!(e.payload_prefix[..], payload[..DECODE_PREFIX_LIMIT]);
        }
        other => panic!("expected decode error, got {other}"),
    }
}

#[test]
fn test_commit_token_requires_both_fields() {
    let mut root = MessageWriter::new();
    root.varint(1, 42);
    assert_eq!(
        decode::<CommitToken>(&root.finish()).unwrap_err().class(),
        FailureClass::Decode
    );

    let mut root = MessageWriter::new();
    root.varint(1, 42).bytes(2, b"blob");
    let token: CommitToken = decode(&root.finish()).unwrap();
    assert_eq!(token.upload_id, 42);
    assert_eq!(token.blob, b"blob".to_vec());
}

#[test]
fn test_media_list_response_items() {
    let raw_id = [0x11u8; 20];
    let text_id = ContentId::from_bytes([0x22; 20]);

    let mut meta = MessageWriter::new();
    meta.string(4, "beach.jpg");
    let mut first = MessageWriter::new();
    first
        .string(1, "AF1QipFirst")
        .message(2, meta)
        .bytes(3, &raw_id)
        .varint(5, 1);

    let mut second = MessageWriter::new();
    second
        .string(1, "AF1QipSecond")
        .string(3, &text_id.to_base64())
        .varint(5, 2);

    let mut keyless = MessageWriter::new();
    keyless.bytes(3, &raw_id);

    let mut body = MessageWriter::new();
    body.string(1, "page-2")
        .message(2, first)
        .message(2, second)
        .message(2, keyless)
        .string(6, "state-abc");
    let mut root = MessageWriter::new();
    root.message(1, body);

    let page: MediaListResponse = decode(&root.finish()).unwrap();
    assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
    assert_eq!(page.state_token.as_deref(), Some("state-abc"));
    assert_eq!(page.items.len(), 2);

    assert_eq!(page.items[0].media_key.as_str(), "AF1QipFirst");
    assert_eq!(page.items[0].file_name.as_deref(), Some("beach.jpg"));
    assert_eq!(page.items[0].content_id, Some(ContentId::from_bytes(raw_id)));
    assert_eq!(page.items[0].kind, Some(MediaKind::Photo));

    assert_eq!(page.items[1].content_id, Some(text_id));
    assert_eq!(page.items[1].kind, Some(MediaKind::Video));
}

#[test]
fn test_media_list_last_page_has_no_token() {
    let mut body = MessageWriter::new();
    body.string(1, "");
    let mut root = MessageWriter::new();
    root.message(1, body);
    let page: MediaListResponse = decode(&root.finish()).unwrap();
    assert!(page.next_page_token.is_none());
    assert!(page.items.is_empty());
}

#[test]
fn test_media_list_request_carries_page_token() {
    let request = MediaListRequest {
        page_token: Some("next".to_string()),
        limit: 0,
    };
    let bytes = encode(&request).unwrap();
    let reader = Reader::new(&bytes);
    let root = reader.parse_root().unwrap();
    let selector = reader.message(&root, 1).unwrap().unwrap();
    assert_eq!(reader.string(&selector, 4).unwrap(), Some("next"));
    assert_eq!(reader.varint(&selector, 2).unwrap(), None);

    let first = encode(&MediaListRequest::default()).unwrap();
    let reader = Reader::new(&first);
    let root = reader.parse_root().unwrap();
    let selector = reader.message(&root, 1).unwrap().unwrap();
    assert_eq!(reader.string(&selector, 4).unwrap(), None);
}
