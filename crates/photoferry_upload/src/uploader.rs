//! Per-file upload state machine.

use crate::transfer::send_file;
use crate::{RetryPolicy, TransferConfig};
use chrono::{DateTime, Utc};
use photoferry_cache::IdentityCache;
use photoferry_core::{
    CacheOrigin, ContentId, DeviceProfile, RemoteRef, UploadOptions, UploadOutcome,
    UploadResult, UploadSuccess, UploadTask,
};
use photoferry_error::{CancelledError, PhotoferryResult, StorageError};
use photoferry_interface::PhotoService;
use photoferry_protocol::CommitRequest;
use photoferry_storage::{ContentIdentifier, FileIdentifier};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Drives one file from identification to a recorded remote reference.
///
/// The steps are identify, check the cache, check the service, transfer,
/// commit and record. The identifier is claimed in the cache for the whole
/// run, so identical content in two workers is only uploaded once; the
/// second worker resolves from the cache after the first commits.
///
/// The cache is written only after a commit or a server-confirmed match.
#[derive(Clone)]
pub struct Uploader {
    service: Arc<dyn PhotoService>,
    cache: Arc<IdentityCache>,
    identifier: Arc<dyn ContentIdentifier>,
    options: UploadOptions,
    retry: RetryPolicy,
    transfer: TransferConfig,
    device: DeviceProfile,
    cancel: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("service", &self.service.service_name())
            .field("options", &self.options)
            .field("retry", &self.retry)
            .field("transfer", &self.transfer)
            .finish()
    }
}

impl Uploader {
    /// Uploader with default retry and transfer settings.
    pub fn new(service: Arc<dyn PhotoService>, cache: Arc<IdentityCache>, options: UploadOptions) -> Self {
        let device = DeviceProfile::for_upload(*options.quality(), *options.use_quota());
        Self {
            service,
            cache,
            identifier: Arc::new(FileIdentifier),
            options,
            retry: RetryPolicy::default(),
            transfer: TransferConfig::default(),
            device,
            cancel: None,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the transfer settings.
    pub fn with_transfer(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    /// Compute identities with `identifier` instead of hashing the file.
    pub fn with_identifier(mut self, identifier: Arc<dyn ContentIdentifier>) -> Self {
        self.identifier = identifier;
        self
    }

    /// Abandon uploads before committing once `cancel` turns true.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Options shared by every file in the run.
    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// The identity cache this uploader records into.
    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Upload one file.
    ///
    /// Failures are returned, never panicked, and affect only this file.
    #[instrument(skip(self, task), fields(file = %task.path().display()))]
    pub async fn upload(&self, task: &UploadTask) -> UploadResult {
        let path = task.path();
        let id = match task.content_id() {
            Some(id) => *id,
            None => {
                self.retry
                    .run("identify", || self.identifier.identify(path))
                    .await?
            }
        };

        let _claim = self.cache.claim(id).await;
        debug!(content_id = %id, "Claimed content identity");

        if !*self.options.force() {
            let remote = match self.check_cache(&id).await? {
                CacheCheck::Hit(success) => return Ok(success),
                CacheCheck::Miss => self.find_remote(&id).await?,
                CacheCheck::Unknown => None,
            };
            if let Some(remote_ref) = remote {
                self.cache.insert(id, remote_ref.clone(), CacheOrigin::ServerDedup);
                info!(content_id = %id, remote_ref = %remote_ref, "Service already has content");
                return Ok(UploadSuccess::new(remote_ref, UploadOutcome::ServerDedup, id));
            }
        }

        self.ensure_not_cancelled(path)?;
        let remote_ref = self
            .retry
            .run("transfer", || self.transfer_and_commit(path, &id))
            .await?;

        self.cache.insert(id, remote_ref.clone(), CacheOrigin::Uploaded);
        info!(content_id = %id, remote_ref = %remote_ref, "Upload committed");
        Ok(UploadSuccess::new(remote_ref, UploadOutcome::Transferred, id))
    }

    async fn check_cache(&self, id: &ContentId) -> PhotoferryResult<CacheCheck> {
        let Some(cached) = self.cache.lookup(id) else {
            return Ok(CacheCheck::Miss);
        };
        if !*self.options.verify_remote() {
            debug!(content_id = %id, remote_ref = %cached, "Cache hit");
            return Ok(CacheCheck::Hit(UploadSuccess::new(cached, UploadOutcome::CacheHit, *id)));
        }

        match self.find_remote(id).await? {
            Some(confirmed) => {
                if confirmed != cached {
                    self.cache.insert(*id, confirmed.clone(), CacheOrigin::ServerDedup);
                }
                debug!(content_id = %id, remote_ref = %confirmed, "Cache hit confirmed by service");
                Ok(CacheCheck::Hit(UploadSuccess::new(confirmed, UploadOutcome::CacheHit, *id)))
            }
            None => {
                tracing::warn!(
                    content_id = %id,
                    remote_ref = %cached,
                    "Cached reference unknown to service, uploading again"
                );
                Ok(CacheCheck::Unknown)
            }
        }
    }

    async fn find_remote(&self, id: &ContentId) -> PhotoferryResult<Option<RemoteRef>> {
        self.retry
            .run("hash_check", || self.service.find_by_content_id(id))
            .await
    }

    async fn transfer_and_commit(&self, path: &Path, id: &ContentId) -> PhotoferryResult<RemoteRef> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| StorageError::from_io(path, &e))?;
        let size = metadata.len();

        let session = self.service.begin_upload(id, size).await?;
        let commit_token = send_file(self.service.as_ref(), &session, path, &self.transfer).await?;

        self.ensure_not_cancelled(path)?;
        let request = CommitRequest {
            commit_token,
            file_name: file_name(path),
            content_id: *id,
            modified_at: modified_at(&metadata),
            quality: *self.options.quality(),
            device: self.device.clone(),
        };
        self.service.commit(&request).await
    }

    fn ensure_not_cancelled(&self, path: &Path) -> PhotoferryResult<()> {
        if self.is_cancelled() {
            debug!(file = %path.display(), "Abandoning upload after cancellation");
            return Err(CancelledError::new(format!(
                "upload of {} cancelled before commit",
                path.display()
            ))
            .into());
        }
        Ok(())
    }
}

/// What the cache says about an identity before the service is asked.
enum CacheCheck {
    Hit(UploadSuccess),
    Miss,
    /// A cached reference the service has already disowned
    Unknown,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Modification time in Unix seconds, or now when unavailable.
fn modified_at(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .map(|t| DateTime::<Utc>::from(t).timestamp())
        .unwrap_or_else(|_| Utc::now().timestamp())
}
