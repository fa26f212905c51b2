//! Upload tasks.

use crate::ContentId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One candidate file for upload.
///
/// A task may carry a caller-trusted digest, in which case identification
/// skips reading the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadTask {
    path: PathBuf,
    content_id: Option<ContentId>,
}

impl UploadTask {
    /// A task whose identity will be computed from the file content.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_id: None,
        }
    }

    /// A task with a precomputed identity.
    pub fn with_content_id(path: impl Into<PathBuf>, content_id: ContentId) -> Self {
        Self {
            path: path.into(),
            content_id: Some(content_id),
        }
    }

    /// Local path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Precomputed identity, if the caller supplied one.
    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id.as_ref()
    }
}
