use photoferry_client::{HttpPhotoService, ServiceConfig};
use photoferry_core::{ContentId, DeviceProfile, QualityTier, RemoteRef};
use photoferry_error::{FailureClass, PhotoferryErrorKind, RetryableError, TransportErrorKind};
use photoferry_interface::{PhotoService, StaticCredential, UploadSession};
use photoferry_protocol::{CommitRequest, CommitToken, MessageWriter};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HASH_CHECK: &str = "/6439526531001121323/5084965799730810217";
const COMMIT: &str = "/6439526531001121323/16538846908252377752";
const MEDIA_LIST: &str = "/6439526531001121323/18047484249733410717";

fn service(server: &MockServer) -> HttpPhotoService {
    let config = ServiceConfig::builder()
        .upload_endpoint(format!("{}/upload", server.uri()))
        .api_endpoint(server.uri())
        .language("en_US")
        .timeout_secs(5u64)
        .build()
        .unwrap();
    HttpPhotoService::new(config, Arc::new(StaticCredential::new("test-token"))).unwrap()
}

fn id() -> ContentId {
    ContentId::from_bytes([0x5a; 20])
}

fn hash_check_body(key: &str) -> Vec<u8> {
    let mut item = MessageWriter::new();
    item.string(1, key);
    let mut matches = MessageWriter::new();
    matches.message(2, item);
    let mut body = MessageWriter::new();
    body.message(2, matches);
    let mut root = MessageWriter::new();
    root.message(1, body);
    root.finish()
}

#[tokio::test]
async fn test_find_by_content_id_sends_auth_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HASH_CHECK))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/x-protobuf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(hash_check_body("AF1QipFound")))
        .expect(1)
        .mount(&server)
        .await;

    let found = service(&server).find_by_content_id(&id()).await.unwrap();
    assert_eq!(found, Some(RemoteRef::new("AF1QipFound").unwrap()));
}

#[tokio::test]
async fn test_find_by_content_id_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HASH_CHECK))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
        .mount(&server)
        .await;

    assert_eq!(service(&server).find_by_content_id(&id()).await.unwrap(), None);
}

#[tokio::test]
async fn test_server_error_is_retryable_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HASH_CHECK))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let err = service(&server).find_by_content_id(&id()).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.class(), FailureClass::Transient);
    match err.kind() {
        PhotoferryErrorKind::Transport(t) => assert_eq!(
            t.kind,
            TransportErrorKind::Http {
                status_code: 503,
                message: "try later".to_string()
            }
        ),
        other => panic!("expected transport error, got {other}"),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HASH_CHECK))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = service(&server).find_by_content_id(&id()).await.unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HASH_CHECK))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x0a, 0xff]))
        .mount(&server)
        .await;

    let err = service(&server).find_by_content_id(&id()).await.unwrap_err();
    assert_eq!(err.class(), FailureClass::Decode);
}

#[tokio::test]
async fn test_begin_upload_reads_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("x-upload-content-length", "2048"))
        .and(header("x-goog-hash", format!("sha1={}", id().to_base64()).as_str()))
        .respond_with(ResponseTemplate::new(200).insert_header("X-GUploader-UploadID", "upload-123"))
        .mount(&server)
        .await;

    let session = service(&server).begin_upload(&id(), 2048).await.unwrap();
    assert_eq!(session.token(), "upload-123");
    assert_eq!(*session.size(), 2048);
}

#[tokio::test]
async fn test_begin_upload_missing_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = service(&server).begin_upload(&id(), 10).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        PhotoferryErrorKind::Transport(t) if matches!(t.kind, TransportErrorKind::MissingHeader(_))
    ));
}

#[tokio::test]
async fn test_upload_chunks_and_finalize() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/upload"))
        .and(query_param("upload_id", "upload-123"))
        .and(header("x-goog-upload-offset", "0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut token = MessageWriter::new();
    token.varint(1, 99).bytes(2, b"commit-blob");
    Mock::given(method("PUT"))
        .and(path("/upload"))
        .and(header("x-goog-upload-offset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(token.finish()))
        .expect(1)
        .mount(&server)
        .await;

    let client = service(&server);
    let session = UploadSession::new("upload-123", id(), 8);
    assert_eq!(
        client.upload_chunk(&session, 0, vec![1; 4], false).await.unwrap(),
        None
    );
    let token = client
        .upload_chunk(&session, 4, vec![2; 4], true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.upload_id, 99);
    assert_eq!(token.blob, b"commit-blob".to_vec());
}

#[tokio::test]
async fn test_commit_rejection_is_permanent() {
    let server = MockServer::start().await;
    let mut body = MessageWriter::new();
    body.string(5, "unsupported file");
    let mut root = MessageWriter::new();
    root.message(1, body);
    Mock::given(method("POST"))
        .and(path(COMMIT))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(root.finish()))
        .mount(&server)
        .await;

    let request = CommitRequest {
        commit_token: CommitToken {
            upload_id: 1,
            blob: vec![1],
        },
        file_name: "clip.mov".to_string(),
        content_id: id(),
        modified_at: 0,
        quality: QualityTier::Original,
        device: DeviceProfile::default(),
    };
    let err = service(&server).commit(&request).await.unwrap_err();
    assert_eq!(err.class(), FailureClass::Rejected);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_list_media_sends_extension_headers() {
    let server = MockServer::start().await;
    let mut body = MessageWriter::new();
    body.string(6, "state-1");
    let mut root = MessageWriter::new();
    root.message(1, body);
    Mock::given(method("POST"))
        .and(path(MEDIA_LIST))
        .and(header("x-goog-ext-173412678-bin", "CgcIAhClARgC"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(root.finish()))
        .expect(1)
        .mount(&server)
        .await;

    let page = service(&server).list_media(None).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.state_token.as_deref(), Some("state-1"));
    assert!(page.next_page_token.is_none());
}
