use async_trait::async_trait;
use photoferry_cache::{IdentityCache, RefreshMode, RemoteSource};
use photoferry_core::{ContentId, RemoteRef};
use photoferry_error::PhotoferryResult;
use photoferry_interface::{
    Credential, LibraryListing, MediaPage, PhotoService, StaticCredential, UploadSession,
};
use photoferry_protocol::{CommitRequest, CommitToken, MediaListItem};
use std::sync::Arc;

struct PagedLibrary;

fn item(key: &str, id: Option<u8>) -> MediaListItem {
    MediaListItem {
        media_key: RemoteRef::new(key).unwrap(),
        file_name: None,
        content_id: id.map(|b| ContentId::from_bytes([b; 20])),
        kind: None,
    }
}

#[async_trait]
impl PhotoService for PagedLibrary {
    async fn find_by_content_id(&self, _id: &ContentId) -> PhotoferryResult<Option<RemoteRef>> {
        Ok(None)
    }

    async fn begin_upload(&self, id: &ContentId, size: u64) -> PhotoferryResult<UploadSession> {
        Ok(UploadSession::new("token", *id, size))
    }

    async fn upload_chunk(
        &self,
        _session: &UploadSession,
        _offset: u64,
        _chunk: Vec<u8>,
        _last: bool,
    ) -> PhotoferryResult<Option<CommitToken>> {
        Ok(None)
    }

    async fn commit(&self, _request: &CommitRequest) -> PhotoferryResult<RemoteRef> {
        Ok(RemoteRef::new("committed").unwrap())
    }

    async fn list_media(&self, page_token: Option<&str>) -> PhotoferryResult<MediaPage> {
        Ok(match page_token {
            None => MediaPage {
                next_page_token: Some("second".to_string()),
                items: vec![item("key-a", Some(1)), item("key-unhashed", None)],
                state_token: None,
            },
            Some(_) => MediaPage {
                next_page_token: None,
                items: vec![item("key-b", Some(2))],
                state_token: Some("state-1".to_string()),
            },
        })
    }
}

#[tokio::test]
async fn test_listing_maps_pages() {
    let listing = LibraryListing::new(Arc::new(PagedLibrary));
    let page = listing.list_page(None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.next_page_token.as_deref(), Some("second"));
    assert!(page.items[1].content_id.is_none());
}

#[tokio::test]
async fn test_listing_drives_cache_refresh() {
    let cache = IdentityCache::in_memory();
    let listing = LibraryListing::new(Arc::new(PagedLibrary));

    let summary = cache.refresh(&listing, RefreshMode::Merge).await.unwrap();
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.seen, 2);
    assert_eq!(summary.added, 2);
    assert_eq!(
        cache.lookup(&ContentId::from_bytes([2; 20])),
        Some(RemoteRef::new("key-b").unwrap())
    );
    assert_eq!(cache.sync_token().as_deref(), Some("state-1"));
}

#[tokio::test]
async fn test_static_credential_hides_token() {
    let credential = StaticCredential::new("secret-token");
    assert_eq!(credential.bearer_token().await.unwrap(), "secret-token");
    assert!(!format!("{:?}", credential).contains("secret"));
}
