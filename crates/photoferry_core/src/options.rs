//! Per-run upload options.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Storage quality requested at commit time.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QualityTier {
    /// Keep the original bytes
    #[default]
    #[display("original")]
    Original,
    /// Space-saving recompression
    #[display("saver")]
    Saver,
}

impl QualityTier {
    /// Wire value sent in the commit request.
    pub fn wire_value(self) -> u64 {
        match self {
            QualityTier::Original => 3,
            QualityTier::Saver => 1,
        }
    }
}

/// Options shared by every task of one upload run.
///
/// # Examples
///
/// ```
/// use photoferry_core::{QualityTier, UploadOptions};
///
/// let options = UploadOptions::builder()
///     .threads(4usize)
///     .quality(QualityTier::Saver)
///     .build()
///     .unwrap();
/// assert_eq!(*options.threads(), 4);
/// assert!(!options.force());
///
/// let defaults = UploadOptions::default();
/// assert_eq!(*defaults.threads(), 1);
/// assert_eq!(*defaults.quality(), QualityTier::Original);
/// ```
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
    build_fn(validate = "Self::validate", error = "photoferry_error::BuilderError")
)]
pub struct UploadOptions {
    /// Transfer even when the content is already known
    #[serde(default)]
    force: bool,

    /// Commit quality tier
    #[serde(default)]
    quality: QualityTier,

    /// Count the upload against the account's storage quota
    #[serde(default)]
    use_quota: bool,

    /// Confirm cache hits with the service before trusting them
    #[serde(default)]
    verify_remote: bool,

    /// Number of concurrent workers (at least 1)
    #[serde(default = "default_threads")]
    threads: usize,

    /// Report per-file progress while the run is in flight
    #[serde(default)]
    show_progress: bool,
}

fn default_threads() -> usize {
    1
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            force: false,
            quality: QualityTier::default(),
            use_quota: false,
            verify_remote: false,
            threads: default_threads(),
            show_progress: false,
        }
    }
}

impl UploadOptions {
    /// Creates a new options builder.
    pub fn builder() -> UploadOptionsBuilder {
        UploadOptionsBuilder::default()
    }

    /// Check option values that deserialization cannot rule out.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads` is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be at least 1".to_string());
        }
        Ok(())
    }
}

impl UploadOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.threads {
            Some(0) => Err("threads must be at least 1".to_string()),
            _ => Ok(()),
        }
    }
}
