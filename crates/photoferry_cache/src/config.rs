//! Identity cache configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the identity cache lives and when it is saved.
///
/// # Examples
///
/// ```
/// use photoferry_cache::IdentityCacheConfig;
///
/// let config = IdentityCacheConfig::default().with_autosave(false);
/// assert!(!config.autosave());
/// assert!(config.resolved_path().ends_with("identity-cache.json"));
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
#[builder(default, build_fn(error = "photoferry_error::BuilderError"))]
pub struct IdentityCacheConfig {
    /// Cache document location; the platform cache directory when unset
    #[serde(default)]
    #[builder(setter(into, strip_option))]
    path: Option<PathBuf>,

    /// Persist after every upload run and refresh
    #[serde(default = "default_autosave")]
    autosave: bool,
}

fn default_autosave() -> bool {
    true
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            autosave: default_autosave(),
        }
    }
}

impl IdentityCacheConfig {
    /// The configured path, or `<cache dir>/photoferry/identity-cache.json`.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("photoferry")
                .join("identity-cache.json")
        })
    }
}
