//! Scriptable in-memory photo service.

#![allow(dead_code)]

use async_trait::async_trait;
use photoferry_core::{ContentId, RemoteRef};
use photoferry_error::{
    PhotoferryResult, TransportError, TransportErrorKind, UploadRejected,
};
use photoferry_interface::{MediaPage, PhotoService, UploadSession};
use photoferry_protocol::{CommitRequest, CommitToken, MediaListItem};
use photoferry_storage::identify_bytes;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Recorded chunk: offset, length, last.
pub type ChunkRecord = (u64, usize, bool);

#[derive(Default)]
pub struct MockPhotoService {
    library: Mutex<HashMap<ContentId, RemoteRef>>,
    sessions: Mutex<HashMap<String, Vec<u8>>>,
    rejected_names: Mutex<HashSet<String>>,
    panic_names: Mutex<HashSet<String>>,
    chunks: Mutex<Vec<ChunkRecord>>,
    transient_commit_failures: AtomicUsize,
    transient_find_failures: AtomicUsize,
    cancel_on_begin: Mutex<Option<watch::Sender<bool>>>,
    commit_delay: Option<Duration>,
    next_id: AtomicUsize,
    pub finds: AtomicUsize,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub commit_attempts: AtomicUsize,
}

impl MockPhotoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// Content the library already holds before the run.
    pub fn with_stored(self, id: ContentId, key: &str) -> Self {
        self.library
            .lock()
            .unwrap()
            .insert(id, RemoteRef::new(key).unwrap());
        self
    }

    /// Commits for this file name are refused.
    pub fn reject(self, file_name: &str) -> Self {
        self.rejected_names
            .lock()
            .unwrap()
            .insert(file_name.to_string());
        self
    }

    /// Committing this file name panics the worker.
    pub fn panic_on(self, file_name: &str) -> Self {
        self.panic_names
            .lock()
            .unwrap()
            .insert(file_name.to_string());
        self
    }

    /// The next `count` commits fail with a 503.
    pub fn fail_commits(self, count: usize) -> Self {
        self.transient_commit_failures.store(count, Ordering::SeqCst);
        self
    }

    /// The next `count` existence checks fail with a 503.
    pub fn fail_finds(self, count: usize) -> Self {
        self.transient_find_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Flip `sender` to cancelled when the first upload session opens.
    pub fn cancel_on_begin(self, sender: watch::Sender<bool>) -> Self {
        *self.cancel_on_begin.lock().unwrap() = Some(sender);
        self
    }

    pub fn stored(&self, id: &ContentId) -> Option<RemoteRef> {
        self.library.lock().unwrap().get(id).cloned()
    }

    pub fn forget(&self, id: &ContentId) {
        self.library.lock().unwrap().remove(id);
    }

    pub fn chunks(&self) -> Vec<ChunkRecord> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn unavailable() -> TransportError {
    TransportError::new(TransportErrorKind::Http {
        status_code: 503,
        message: "backend unavailable".to_string(),
    })
}

#[async_trait]
impl PhotoService for MockPhotoService {
    async fn find_by_content_id(&self, id: &ContentId) -> PhotoferryResult<Option<RemoteRef>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.transient_find_failures) {
            return Err(unavailable().into());
        }
        Ok(self.stored(id))
    }

    async fn begin_upload(&self, id: &ContentId, size: u64) -> PhotoferryResult<UploadSession> {
        let n = self.begins.fetch_add(1, Ordering::SeqCst);
        if let Some(sender) = self.cancel_on_begin.lock().unwrap().as_ref() {
            sender.send_replace(true);
        }
        let token = format!("session-{}", n);
        self.sessions.lock().unwrap().insert(token.clone(), Vec::new());
        Ok(UploadSession::new(token, *id, size))
    }

    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Vec<u8>,
        last: bool,
    ) -> PhotoferryResult<Option<CommitToken>> {
        self.chunks.lock().unwrap().push((offset, chunk.len(), last));
        let mut sessions = self.sessions.lock().unwrap();
        let received = sessions.entry(session.token().clone()).or_default();
        assert_eq!(received.len() as u64, offset, "chunks must arrive in order");
        received.extend_from_slice(&chunk);
        if !last {
            return Ok(None);
        }
        assert_eq!(received.len() as u64, *session.size());
        assert_eq!(identify_bytes(received), *session.content_id());
        Ok(Some(CommitToken {
            upload_id: self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1,
            blob: session.content_id().as_bytes().to_vec(),
        }))
    }

    async fn commit(&self, request: &CommitRequest) -> PhotoferryResult<RemoteRef> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        if Self::take_failure(&self.transient_commit_failures) {
            return Err(unavailable().into());
        }
        let panics = self.panic_names.lock().unwrap().contains(&request.file_name);
        if panics {
            panic!("service crashed on {}", request.file_name);
        }
        if self.rejected_names.lock().unwrap().contains(&request.file_name) {
            return Err(UploadRejected::new("quota exceeded").into());
        }
        assert_eq!(request.commit_token.blob, request.content_id.as_bytes().to_vec());

        self.commits.fetch_add(1, Ordering::SeqCst);
        let key = RemoteRef::new(format!("AF1Qip-{}", &request.content_id.to_hex()[..12])).unwrap();
        self.library
            .lock()
            .unwrap()
            .insert(request.content_id, key.clone());
        Ok(key)
    }

    async fn list_media(&self, _page_token: Option<&str>) -> PhotoferryResult<MediaPage> {
        let items = self
            .library
            .lock()
            .unwrap()
            .iter()
            .map(|(id, key)| MediaListItem {
                media_key: key.clone(),
                file_name: None,
                content_id: Some(*id),
                kind: None,
            })
            .collect();
        Ok(MediaPage {
            next_page_token: None,
            items,
            state_token: None,
        })
    }

    fn service_name(&self) -> &str {
        "mock"
    }
}

/// Write `contents` under `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
