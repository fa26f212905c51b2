//! Per-file results and aggregate reports.

use crate::{ContentId, RemoteRef};
use derive_getters::Getters;
use photoferry_error::PhotoferryResult;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How a successful upload was resolved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The local identity cache already knew the content
    #[display("cache_hit")]
    CacheHit,
    /// The service reported the content as already stored
    #[display("server_dedup")]
    ServerDedup,
    /// The bytes were transferred and committed
    #[display("transferred")]
    Transferred,
}

/// A file that now has a remote reference.
///
/// # Examples
///
/// ```
/// use photoferry_core::{ContentId, RemoteRef, UploadOutcome, UploadSuccess};
///
/// let id = ContentId::from_bytes([7; 20]);
/// let success = UploadSuccess::new(RemoteRef::new("key").unwrap(), UploadOutcome::ServerDedup, id);
/// assert!(success.is_dedup_hit());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct UploadSuccess {
    remote_ref: RemoteRef,
    outcome: UploadOutcome,
    content_id: ContentId,
}

impl UploadSuccess {
    /// Record a resolved upload.
    pub fn new(remote_ref: RemoteRef, outcome: UploadOutcome, content_id: ContentId) -> Self {
        Self {
            remote_ref,
            outcome,
            content_id,
        }
    }

    /// True when no bytes were transferred.
    pub fn is_dedup_hit(&self) -> bool {
        matches!(
            self.outcome,
            UploadOutcome::CacheHit | UploadOutcome::ServerDedup
        )
    }
}

/// Outcome of one upload task.
pub type UploadResult = PhotoferryResult<UploadSuccess>;

/// Outcomes of a whole run, keyed by input path.
///
/// Every scheduled task has exactly one entry, including failures.
#[derive(Debug, Clone)]
pub struct UploadReport {
    run_id: Uuid,
    results: BTreeMap<PathBuf, UploadResult>,
}

impl UploadReport {
    /// Empty report for a new run.
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            results: BTreeMap::new(),
        }
    }

    /// Identifier used to correlate this run's log lines.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record the result for one path, replacing any earlier result.
    pub fn insert(&mut self, path: PathBuf, result: UploadResult) {
        self.results.insert(path, result);
    }

    /// The result recorded for `path`.
    pub fn get(&self, path: &Path) -> Option<&UploadResult> {
        self.results.get(path)
    }

    /// All results in path order.
    pub fn results(&self) -> &BTreeMap<PathBuf, UploadResult> {
        &self.results
    }

    /// Iterate results in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &UploadResult)> {
        self.results.iter()
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True if no task was scheduled.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Files that resolved to a remote reference.
    pub fn succeeded(&self) -> usize {
        self.results.values().filter(|r| r.is_ok()).count()
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.results.values().filter(|r| r.is_err()).count()
    }

    /// Successes that needed no transfer.
    pub fn dedup_hits(&self) -> usize {
        self.successes().filter(|s| s.is_dedup_hit()).count()
    }

    /// Successes that transferred bytes.
    pub fn transferred(&self) -> usize {
        self.successes()
            .filter(|s| *s.outcome() == UploadOutcome::Transferred)
            .count()
    }

    /// Path to remote reference for every success.
    pub fn references(&self) -> BTreeMap<&Path, &RemoteRef> {
        self.results
            .iter()
            .filter_map(|(path, result)| {
                result
                    .as_ref()
                    .ok()
                    .map(|s| (path.as_path(), s.remote_ref()))
            })
            .collect()
    }

    fn successes(&self) -> impl Iterator<Item = &UploadSuccess> {
        self.results.values().filter_map(|r| r.as_ref().ok())
    }
}
