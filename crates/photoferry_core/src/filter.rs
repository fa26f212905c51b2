//! File selection options.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How candidate files are filtered while walking a target.
///
/// With the defaults, every file under the target is a candidate. Setting an
/// expression excludes matching file names; clearing `exclude` keeps only
/// matching names instead.
///
/// # Examples
///
/// ```
/// use photoferry_core::FilterOptions;
///
/// let filter = FilterOptions::builder()
///     .expression("copy")
///     .ignore_case(true)
///     .build()
///     .unwrap();
/// assert_eq!(filter.expression().as_deref(), Some("copy"));
/// assert!(*filter.exclude());
/// assert!(*filter.recursive());
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
pub struct FilterOptions {
    /// Pattern applied to file names
    #[serde(default)]
    #[builder(setter(into, strip_option))]
    expression: Option<String>,

    /// Match without regard to case
    #[serde(default)]
    ignore_case: bool,

    /// Treat the expression as a regular expression instead of a glob
    #[serde(default)]
    regex: bool,

    /// Skip matching files (true) or keep only matching files (false)
    #[serde(default = "default_true")]
    exclude: bool,

    /// Descend into subdirectories
    #[serde(default = "default_true")]
    recursive: bool,

    /// Only yield known photo and video extensions
    #[serde(default)]
    media_only: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            expression: None,
            ignore_case: false,
            regex: false,
            exclude: default_true(),
            recursive: default_true(),
            media_only: false,
        }
    }
}

impl FilterOptions {
    /// Creates a new filter builder.
    pub fn builder() -> FilterOptionsBuilder {
        FilterOptionsBuilder::default()
    }
}
