//! Application configuration.
//!
//! Configuration is layered with the `config` crate:
//! - Bundled defaults (include_str! from photoferry.toml)
//! - User config in the platform config directory (~/.config/photoferry/photoferry.toml)
//! - photoferry.toml in the current directory
//!
//! Later sources override earlier ones key by key.

use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use derive_getters::Getters;
use photoferry_cache::IdentityCacheConfig;
use photoferry_client::ServiceConfig;
use photoferry_core::{FilterOptions, QualityTier, UploadOptions};
use photoferry_error::{ConfigError, PhotoferryError, PhotoferryResult};
use photoferry_upload::{DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD, RetryPolicy, TransferConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../photoferry.toml");

fn default_threads() -> usize {
    1
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_threshold() -> u64 {
    DEFAULT_CHUNK_THRESHOLD
}

/// The `[upload]` table.
///
/// Collects per-run options, retry tuning and transfer sizing in one place;
/// see [`upload_options`](Self::upload_options),
/// [`retry_policy`](Self::retry_policy) and
/// [`transfer_config`](Self::transfer_config).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(
    default,
    setter(into),
    build_fn(error = "photoferry_error::BuilderError")
)]
pub struct UploadSettings {
    /// Concurrent workers
    #[serde(default = "default_threads")]
    threads: usize,

    /// Transfer even when the content is already known
    #[serde(default)]
    force: bool,

    /// Draw a progress bar
    #[serde(default)]
    show_progress: bool,

    /// Commit quality tier
    #[serde(default)]
    quality: QualityTier,

    /// Count uploads against the storage quota
    #[serde(default)]
    use_quota: bool,

    /// Confirm cache hits with the service
    #[serde(default)]
    verify_remote: bool,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    max_retries: usize,

    /// First retry delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,

    /// Longest retry delay in seconds
    #[serde(default = "default_max_backoff_secs")]
    max_backoff_secs: u64,

    /// Piece size for chunked transfer
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,

    /// Largest file sent in a single request
    #[serde(default = "default_chunk_threshold")]
    chunk_threshold: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            force: false,
            show_progress: false,
            quality: QualityTier::default(),
            use_quota: false,
            verify_remote: false,
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            chunk_size: default_chunk_size(),
            chunk_threshold: default_chunk_threshold(),
        }
    }
}

impl UploadSettings {
    /// Per-run options for the uploader.
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions::default()
            .with_threads(self.threads)
            .with_force(self.force)
            .with_show_progress(self.show_progress)
            .with_quality(self.quality)
            .with_use_quota(self.use_quota)
            .with_verify_remote(self.verify_remote)
    }

    /// Retry tuning.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff_ms(self.initial_backoff_ms)
            .with_max_backoff_secs(self.max_backoff_secs)
    }

    /// Chunking thresholds.
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_chunk_threshold(self.chunk_threshold)
    }
}

/// Top-level photoferry configuration.
///
/// # Example
///
/// ```no_run
/// use photoferry::PhotoferryConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PhotoferryConfig::load()?;
/// println!("{} workers", config.upload().threads());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct PhotoferryConfig {
    /// `[upload]`
    #[serde(default)]
    upload: UploadSettings,

    /// `[filter]`
    #[serde(default)]
    filter: FilterOptions,

    /// `[cache]`
    #[serde(default)]
    cache: IdentityCacheConfig,

    /// `[service]`
    #[serde(default)]
    service: ServiceConfig,
}

fn build(builder: ConfigBuilder<DefaultState>, origin: &str) -> PhotoferryResult<PhotoferryConfig> {
    builder
        .build()
        .map_err(|e| {
            PhotoferryError::from(ConfigError::new(format!(
                "Failed to read configuration from {}: {}",
                origin, e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            PhotoferryError::from(ConfigError::new(format!(
                "Failed to parse configuration from {}: {}",
                origin, e
            )))
        })
}

impl PhotoferryConfig {
    /// Load bundled defaults overlaid with the user and working-directory files.
    ///
    /// Missing user files are skipped.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> PhotoferryResult<Self> {
        debug!("Loading configuration: current dir > user config dir > bundled defaults");

        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("photoferry").join("photoferry.toml");
            builder = builder.add_source(File::from(user_config).required(false));
        }

        builder = builder.add_source(File::with_name("photoferry").required(false));

        build(builder, "default locations")
    }

    /// Load bundled defaults overlaid with one explicit file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> PhotoferryResult<Self> {
        debug!("Loading configuration from file");
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        build(builder, &path.as_ref().display().to_string())
    }

    /// Parse TOML text without the bundled defaults underneath.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> PhotoferryResult<Self> {
        build(
            Config::builder().add_source(File::from_str(text, FileFormat::Toml)),
            "inline TOML",
        )
    }

    /// Reject values that cannot drive a run.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero workers or a zero chunk size.
    pub fn validate(&self) -> PhotoferryResult<()> {
        self.upload
            .upload_options()
            .validate()
            .map_err(ConfigError::new)?;
        self.upload.transfer_config().validate()
    }
}
