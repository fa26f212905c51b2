//! In-memory photo library.

#![allow(dead_code)]

use async_trait::async_trait;
use photoferry::{ContentId, PhotoferryResult, RemoteRef, UploadRejected};
use photoferry_interface::{MediaPage, PhotoService, UploadSession};
use photoferry_protocol::{CommitRequest, CommitToken, MediaListItem};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockPhotoService {
    library: Mutex<BTreeMap<String, ContentId>>,
    rejected_names: Mutex<HashSet<String>>,
    uploads: Mutex<HashMap<String, usize>>,
    pub finds: AtomicUsize,
    pub commits: AtomicUsize,
    pub lists: AtomicUsize,
}

impl MockPhotoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(self, id: ContentId, key: &str) -> Self {
        self.library.lock().unwrap().insert(key.to_string(), id);
        self
    }

    pub fn reject(self, file_name: &str) -> Self {
        self.rejected_names
            .lock()
            .unwrap()
            .insert(file_name.to_string());
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Number of commits per file name.
    pub fn uploads_of(&self, file_name: &str) -> usize {
        self.uploads
            .lock()
            .unwrap()
            .get(file_name)
            .copied()
            .unwrap_or_default()
    }

    fn key_for(&self, id: &ContentId) -> Option<RemoteRef> {
        self.library
            .lock()
            .unwrap()
            .iter()
            .find(|(_, stored)| *stored == id)
            .map(|(key, _)| RemoteRef::new(key.clone()).unwrap())
    }
}

#[async_trait]
impl PhotoService for MockPhotoService {
    async fn find_by_content_id(&self, id: &ContentId) -> PhotoferryResult<Option<RemoteRef>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(self.key_for(id))
    }

    async fn begin_upload(&self, id: &ContentId, size: u64) -> PhotoferryResult<UploadSession> {
        Ok(UploadSession::new(format!("session-{}", id.to_hex()), *id, size))
    }

    async fn upload_chunk(
        &self,
        session: &UploadSession,
        _offset: u64,
        _chunk: Vec<u8>,
        last: bool,
    ) -> PhotoferryResult<Option<CommitToken>> {
        Ok(last.then(|| CommitToken {
            upload_id: *session.size(),
            blob: session.content_id().as_bytes().to_vec(),
        }))
    }

    async fn commit(&self, request: &CommitRequest) -> PhotoferryResult<RemoteRef> {
        if self.rejected_names.lock().unwrap().contains(&request.file_name) {
            return Err(UploadRejected::new("unsupported file type").into());
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        *self
            .uploads
            .lock()
            .unwrap()
            .entry(request.file_name.clone())
            .or_default() += 1;

        let key = format!("AF1Qip-{}", &request.content_id.to_hex()[..10]);
        self.library
            .lock()
            .unwrap()
            .insert(key.clone(), request.content_id);
        Ok(RemoteRef::new(key).unwrap())
    }

    async fn list_media(&self, page_token: Option<&str>) -> PhotoferryResult<MediaPage> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        // One item per page, keyed by the previous item's media key.
        let library = self.library.lock().unwrap();
        let mut remaining = library
            .iter()
            .skip_while(|(key, _)| page_token.is_some_and(|token| key.as_str() <= token));
        let Some((key, id)) = remaining.next() else {
            return Ok(MediaPage::default());
        };
        let next_page_token = remaining.next().map(|_| key.clone());
        Ok(MediaPage {
            next_page_token,
            items: vec![MediaListItem {
                media_key: RemoteRef::new(key.clone()).unwrap(),
                file_name: None,
                content_id: Some(*id),
                kind: None,
            }],
            state_token: Some("state-1".to_string()),
        })
    }
}
