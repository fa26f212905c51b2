//! Target traversal.

use crate::NameFilter;
use photoferry_core::{ContentId, FilterOptions, UploadTask};
use photoferry_error::{ConfigError, PhotoferryResult, StorageError, StorageErrorKind};
use photoferry_storage::MediaKind;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Produces upload candidates from a file or directory target.
///
/// Directories are walked in file-name order with symlinks followed. Each
/// real file is yielded once, however many links lead to it, and symlink
/// cycles are skipped. A file target is yielded as-is without filtering.
///
/// # Examples
///
/// ```no_run
/// use photoferry_core::FilterOptions;
/// use photoferry_select::FileSelector;
///
/// let selector = FileSelector::new("/photos", FilterOptions::default()).unwrap();
/// for path in selector.candidates() {
///     println!("{}", path.unwrap().display());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSelector {
    root: PathBuf,
    options: FilterOptions,
    filter: NameFilter,
    known_digests: HashMap<PathBuf, ContentId>,
}

impl FileSelector {
    /// Prepare to select from `root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `root` does not exist or the filter
    /// expression does not compile.
    pub fn new(root: impl Into<PathBuf>, options: FilterOptions) -> PhotoferryResult<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(ConfigError::new(format!("Target does not exist: {}", root.display())).into());
        }
        let filter = NameFilter::new(&options)?;
        Ok(Self {
            root,
            options,
            filter,
            known_digests: HashMap::new(),
        })
    }

    /// Attach caller-trusted digests to the files they name.
    ///
    /// Tasks for those files skip hashing.
    pub fn with_known_digests(mut self, digests: HashMap<PathBuf, ContentId>) -> Self {
        self.known_digests = digests
            .into_iter()
            .map(|(path, id)| (canonical_or_given(&path), id))
            .collect();
        self
    }

    /// The target being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the target.
    ///
    /// Calling this again restarts from the root.
    pub fn candidates(&self) -> Candidates<'_> {
        let mut walk = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name();
        if !*self.options.recursive() {
            walk = walk.max_depth(1);
        }

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let walker = walk.into_iter().filter_entry(move |entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            match std::fs::canonicalize(entry.path()) {
                Ok(real) => {
                    let first = seen_dirs.insert(real);
                    if !first {
                        tracing::debug!(dir = %entry.path().display(), "Directory already walked");
                    }
                    first
                }
                Err(_) => true,
            }
        });

        Candidates {
            walker: Box::new(walker),
            filter: &self.filter,
            media_only: *self.options.media_only(),
            seen_files: HashSet::new(),
        }
    }

    /// Candidates as upload tasks, with known digests attached.
    pub fn tasks(&self) -> impl Iterator<Item = PhotoferryResult<UploadTask>> + '_ {
        self.candidates().map(move |candidate| {
            let path = candidate?;
            let known = self
                .known_digests
                .get(&canonical_or_given(&path))
                .or_else(|| self.known_digests.get(&path));
            Ok(match known {
                Some(id) => UploadTask::with_content_id(path, *id),
                None => UploadTask::new(path),
            })
        })
    }
}

fn canonical_or_given(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lazy candidate iterator returned by [`FileSelector::candidates`].
///
/// Unreadable entries surface as errors without ending the walk.
pub struct Candidates<'a> {
    walker: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
    filter: &'a NameFilter,
    media_only: bool,
    seen_files: HashSet<PathBuf>,
}

impl std::fmt::Debug for Candidates<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidates")
            .field("media_only", &self.media_only)
            .field("seen", &self.seen_files.len())
            .finish()
    }
}

impl Iterator for Candidates<'_> {
    type Item = PhotoferryResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        tracing::debug!(
                            path = ?e.path(),
                            ancestor = %ancestor.display(),
                            "Skipping symlink cycle"
                        );
                        continue;
                    }
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    tracing::warn!(path = %path, error = %e, "Unreadable entry");
                    return Some(Err(StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        path, e
                    )))
                    .into()));
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let real = match std::fs::canonicalize(path) {
                Ok(real) => real,
                Err(e) => return Some(Err(StorageError::from_io(path, &e).into())),
            };
            if !self.seen_files.insert(real) {
                tracing::debug!(file = %path.display(), "Already selected through another link");
                continue;
            }

            if entry.depth() > 0 {
                if self.media_only && MediaKind::from_path(path).is_none() {
                    continue;
                }
                if !self.filter.accepts(path) {
                    tracing::debug!(file = %path.display(), "Filtered out");
                    continue;
                }
            }

            return Some(Ok(entry.into_path()));
        }
    }
}
