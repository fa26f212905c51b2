use photoferry_core::{ContentId, RemoteRef};
use photoferry_error::StorageErrorKind;

// SHA-1 of "abc"
const ABC_HEX: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";
const ABC_B64: &str = "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=";
const ABC_DEDUP: &str = "qZk-NkcGgWq6PiVxeFDCbJzQ2J0";

#[test]
fn test_all_textual_forms_parse_to_same_id() {
    let from_hex = ContentId::parse(ABC_HEX).unwrap();
    let from_b64 = ContentId::parse(ABC_B64).unwrap();
    let from_dedup = ContentId::parse(ABC_DEDUP).unwrap();

    assert_eq!(from_hex, from_b64);
    assert_eq!(from_hex, from_dedup);
    assert_eq!(from_hex.to_base64(), ABC_B64);
    assert_eq!(from_hex.dedup_key(), ABC_DEDUP);
}

#[test]
fn test_uppercase_hex_is_accepted() {
    let id = ContentId::parse(&ABC_HEX.to_uppercase()).unwrap();
    assert_eq!(id.to_hex(), ABC_HEX);
}

#[test]
fn test_wrong_length_digest_is_rejected() {
    // 16 bytes of base64, an MD5-sized digest
    let err = ContentId::parse("AAAAAAAAAAAAAAAAAAAAAA==").unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::InvalidDigest(_)));

    let err = ContentId::parse("not a digest!").unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::InvalidDigest(_)));
}

#[test]
fn test_serializes_as_hex_string() {
    let id = ContentId::parse(ABC_HEX).unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", ABC_HEX));
    let back: ContentId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_empty_remote_ref_is_rejected() {
    assert!(RemoteRef::new("   ").is_err());
    assert!(serde_json::from_str::<RemoteRef>("\"\"").is_err());
}
