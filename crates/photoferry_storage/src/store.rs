//! Cache persistence trait.

use photoferry_error::PhotoferryResult;
use std::sync::Mutex;

/// Durable home for the serialized identity cache.
///
/// Implementations must make `save` atomic enough that a crash mid-write
/// leaves the previously committed document readable.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the committed document, or `None` if nothing was ever saved.
    async fn load(&self) -> PhotoferryResult<Option<Vec<u8>>>;

    /// Replace the committed document.
    async fn save(&self, document: &[u8]) -> PhotoferryResult<()>;

    /// Human-readable location for log messages.
    fn describe(&self) -> String;
}

/// In-memory store, for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a document, committed or corrupt.
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn load(&self) -> PhotoferryResult<Option<Vec<u8>>> {
        Ok(self.snapshot())
    }

    async fn save(&self, document: &[u8]) -> PhotoferryResult<()> {
        let mut guard = self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(document.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
