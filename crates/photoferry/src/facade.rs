//! High-level upload, lookup and refresh operations.

use crate::{IndicatifProgress, PhotoferryConfig};
use photoferry_cache::{CacheLoadWarning, CacheStats, IdentityCache, RefreshMode, RefreshSummary};
use photoferry_client::HttpPhotoService;
use photoferry_core::{
    CacheOrigin, ContentId, DeviceProfile, FilterOptions, RemoteRef, UploadOptions, UploadReport,
    UploadTask,
};
use photoferry_error::{ConfigError, PhotoferryResult};
use photoferry_interface::{Credential, LibraryListing, PhotoService};
use photoferry_select::FileSelector;
use photoferry_storage::{JsonFileStore, accept_digest};
use photoferry_upload::{NoProgress, ProgressReporter, UploadScheduler, Uploader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Options for one upload call.
///
/// Starts from the configured defaults; see [`Photoferry::request`].
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into), build_fn(error = "photoferry_error::BuilderError"))]
pub struct UploadRequest {
    /// Per-run upload options
    options: UploadOptions,
    /// Candidate filtering for directory targets
    filter: FilterOptions,
}

impl UploadRequest {
    /// Start a builder.
    pub fn builder() -> UploadRequestBuilder {
        UploadRequestBuilder::default()
    }

    /// The request described by `config`.
    pub fn from_config(config: &PhotoferryConfig) -> Self {
        Self {
            options: config.upload().upload_options(),
            filter: config.filter().clone(),
        }
    }

    fn validate(&self) -> PhotoferryResult<()> {
        self.options.validate().map_err(ConfigError::new)?;
        Ok(())
    }
}

/// Entry point tying the service, the identity cache and the pipeline together.
///
/// # Example
///
/// ```no_run
/// use photoferry::{Photoferry, PhotoferryConfig};
/// use photoferry_interface::StaticCredential;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PhotoferryConfig::load()?;
/// let ferry = Photoferry::from_config(config, Arc::new(StaticCredential::new("token"))).await?;
/// let report = ferry.upload("/photos/2024", ferry.request()).await?;
/// println!("{} succeeded, {} failed", report.succeeded(), report.failed());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Photoferry {
    service: Arc<dyn PhotoService>,
    cache: Arc<IdentityCache>,
    config: PhotoferryConfig,
    cancel: Option<watch::Receiver<bool>>,
    cache_warning: Option<CacheLoadWarning>,
}

impl std::fmt::Debug for Photoferry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photoferry")
            .field("service", &self.service.service_name())
            .field("cache_entries", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Photoferry {
    /// Assemble from parts.
    pub fn new(service: Arc<dyn PhotoService>, cache: Arc<IdentityCache>, config: PhotoferryConfig) -> Self {
        Self {
            service,
            cache,
            config,
            cancel: None,
            cache_warning: None,
        }
    }

    /// Build the HTTP service and open the configured cache file.
    ///
    /// An unusable cache file does not fail construction; the cache starts
    /// empty and the reason is available from [`cache_warning`](Self::cache_warning).
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings or when the HTTP
    /// client cannot be built.
    #[instrument(skip_all)]
    pub async fn from_config(config: PhotoferryConfig, credential: Arc<dyn Credential>) -> PhotoferryResult<Self> {
        config.validate()?;

        let upload = config.upload();
        let device = DeviceProfile::for_upload(*upload.quality(), *upload.use_quota());
        let service = HttpPhotoService::new(config.service().clone(), credential)?.with_device(device);

        let store = JsonFileStore::new(config.cache().resolved_path());
        let (cache, warning) = IdentityCache::open(Arc::new(store)).await;

        let mut ferry = Self::new(Arc::new(service), Arc::new(cache), config);
        ferry.cache_warning = warning;
        Ok(ferry)
    }

    /// Stop starting new uploads once `cancel` turns true.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &PhotoferryConfig {
        &self.config
    }

    /// The identity cache.
    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    /// Why the cache started empty, if its stored state was unusable.
    pub fn cache_warning(&self) -> Option<&CacheLoadWarning> {
        self.cache_warning.as_ref()
    }

    /// An upload request with the configured defaults.
    pub fn request(&self) -> UploadRequest {
        UploadRequest::from_config(&self.config)
    }

    /// Upload a file or every selected file under a directory.
    ///
    /// # Errors
    ///
    /// Fails before any upload starts when the target does not exist, the
    /// filter does not compile or the options are invalid. Per-file failures
    /// are recorded in the report instead.
    #[instrument(skip(self, target, request), fields(root = %target.as_ref().display()))]
    pub async fn upload(&self, target: impl AsRef<Path>, request: UploadRequest) -> PhotoferryResult<UploadReport> {
        request.validate()?;
        self.config.upload().transfer_config().validate()?;
        let selector = FileSelector::new(target.as_ref(), request.filter().clone())?;

        let mut tasks = Vec::new();
        for candidate in selector.tasks() {
            match candidate {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(error = %e, "Skipping unreadable entry"),
            }
        }
        info!(candidates = tasks.len(), "Selected files");

        self.run(tasks, request.options()).await
    }

    /// Upload files whose digests the caller already knows.
    ///
    /// Digests are format-checked but not recomputed. A malformed digest
    /// fails only its own file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options.
    #[instrument(skip(self, digests, request), fields(files = digests.len()))]
    pub async fn upload_with_digests(
        &self,
        digests: HashMap<PathBuf, String>,
        request: UploadRequest,
    ) -> PhotoferryResult<UploadReport> {
        request.validate()?;
        self.config.upload().transfer_config().validate()?;

        let mut tasks = Vec::with_capacity(digests.len());
        let mut malformed = Vec::new();
        for (path, digest) in digests {
            match accept_digest(&path, &digest) {
                Ok(id) => tasks.push(UploadTask::with_content_id(path, id)),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Malformed digest");
                    malformed.push((path, e));
                }
            }
        }
        tasks.sort_by(|a, b| a.path().cmp(b.path()));

        let mut report = self.run(tasks, request.options()).await?;
        for (path, error) in malformed {
            report.insert(path, Err(error));
        }
        Ok(report)
    }

    async fn run(&self, tasks: Vec<UploadTask>, options: &UploadOptions) -> PhotoferryResult<UploadReport> {
        let settings = self.config.upload();
        let uploader = Uploader::new(Arc::clone(&self.service), Arc::clone(&self.cache), options.clone())
            .with_retry(settings.retry_policy())
            .with_transfer(settings.transfer_config());

        let mut scheduler = UploadScheduler::new(uploader);
        if let Some(cancel) = &self.cancel {
            scheduler = scheduler.with_cancellation(cancel.clone());
        }

        let reporter: Box<dyn ProgressReporter> = if *options.show_progress() {
            Box::new(IndicatifProgress::new())
        } else {
            Box::new(NoProgress)
        };
        let report = scheduler.run_with_progress(tasks, reporter).await?;

        if let Err(e) = self.autosave().await {
            warn!(error = %e, "Uploads finished but the identity cache was not saved");
        }
        Ok(report)
    }

    /// Resolve a textual digest to a remote reference.
    ///
    /// Accepts hex, base64 or dedup-key form. The local cache answers first;
    /// otherwise the service is asked and a hit is cached.
    ///
    /// # Errors
    ///
    /// Returns a storage error for a malformed digest, or the service error
    /// once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn lookup_by_identifier(&self, identifier: &str) -> PhotoferryResult<Option<RemoteRef>> {
        let id = ContentId::parse(identifier)?;
        if let Some(remote_ref) = self.cache.lookup(&id) {
            debug!(content_id = %id, remote_ref = %remote_ref, "Resolved from cache");
            return Ok(Some(remote_ref));
        }

        let found = self
            .config
            .upload()
            .retry_policy()
            .run("hash_check", || self.service.find_by_content_id(&id))
            .await?;
        if let Some(remote_ref) = &found {
            self.cache.insert(id, remote_ref.clone(), CacheOrigin::ServerDedup);
            self.autosave().await?;
        }
        Ok(found)
    }

    /// Rebuild the cache from a full library enumeration.
    ///
    /// # Errors
    ///
    /// Returns the first listing error. Pages already merged are kept and
    /// saved when autosave is on.
    #[instrument(skip(self))]
    pub async fn refresh_cache(&self, mode: RefreshMode) -> PhotoferryResult<RefreshSummary> {
        let listing = LibraryListing::new(Arc::clone(&self.service));
        let result = self.cache.refresh(&listing, mode).await;
        self.autosave().await?;
        let summary = result?;
        info!(
            pages = summary.pages,
            added = summary.added,
            reconciled = summary.reconciled,
            removed = summary.removed,
            "Cache refreshed"
        );
        Ok(summary)
    }

    /// Entry counts of the identity cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn autosave(&self) -> PhotoferryResult<()> {
        if *self.config.cache().autosave() {
            self.cache.persist_if_dirty().await?;
        }
        Ok(())
    }
}
