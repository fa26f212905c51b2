//! File-backed cache store.

use crate::CacheStore;
use photoferry_error::{PhotoferryResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Cache store backed by a single JSON file.
///
/// Each save writes and syncs its own sibling temp file, then renames it over
/// the target, so a reader sees either the old document or the new one, never
/// a torn write. Concurrent saves never share a temp file; the last rename wins.
///
/// ```text
/// ~/.cache/photoferry/
/// ├── identity-cache.json              (committed document)
/// └── identity-cache.json.<uuid>.tmp   (present only during a save)
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`. The file and its parent directory are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the committed document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    async fn write_synced(temp_path: &Path, document: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(document).await?;
        file.sync_all().await
    }
}

#[async_trait::async_trait]
impl CacheStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> PhotoferryResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                tracing::debug!(bytes = data.len(), "Read cache document");
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No cache document yet");
                Ok(None)
            }
            Err(e) => Err(StorageError::from_io(&self.path, &e).into()),
        }
    }

    #[tracing::instrument(skip(self, document), fields(path = %self.path.display(), bytes = document.len()))]
    async fn save(&self, document: &[u8]) -> PhotoferryResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.temp_path();
        if let Err(e) = Self::write_synced(&temp_path, document).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
            .into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )))
            .into());
        }

        tracing::debug!("Committed cache document");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
