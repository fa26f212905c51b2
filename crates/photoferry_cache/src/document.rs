//! Versioned on-disk cache document.

use photoferry_core::{CacheEntry, ContentId};
use photoferry_error::{CacheError, CacheErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Current cache document format version.
pub const CACHE_DOCUMENT_VERSION: u32 = 1;

/// Serialized form of the cache, keyed by dedup key.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CacheDocument {
    version: u32,
    entries: BTreeMap<String, CacheEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_page_token: Option<String>,
}

/// Decoded cache state.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    pub entries: HashMap<ContentId, CacheEntry>,
    pub sync_token: Option<String>,
    pub next_page_token: Option<String>,
}

impl CacheDocument {
    pub(crate) fn from_state(
        entries: &HashMap<ContentId, CacheEntry>,
        sync_token: Option<String>,
        next_page_token: Option<String>,
    ) -> Self {
        Self {
            version: CACHE_DOCUMENT_VERSION,
            entries: entries
                .iter()
                .map(|(id, entry)| (id.dedup_key(), entry.clone()))
                .collect(),
            sync_token,
            next_page_token,
        }
    }

    /// Parse and validate a stored document.
    ///
    /// The whole document is rejected when it is not valid JSON, has another
    /// version, or contains a key that is not a content identifier.
    pub(crate) fn decode(bytes: &[u8]) -> Result<CacheState, CacheError> {
        let document: CacheDocument = serde_json::from_slice(bytes)
            .map_err(|e| CacheError::new(CacheErrorKind::Corrupted(e.to_string())))?;

        if document.version != CACHE_DOCUMENT_VERSION {
            return Err(CacheError::new(CacheErrorKind::Corrupted(format!(
                "unsupported document version {} (expected {})",
                document.version, CACHE_DOCUMENT_VERSION
            ))));
        }

        let mut entries = HashMap::with_capacity(document.entries.len());
        for (key, entry) in document.entries {
            let id = ContentId::parse(&key).map_err(|e| {
                CacheError::new(CacheErrorKind::Corrupted(format!(
                    "bad entry key '{}': {}",
                    key, e.kind
                )))
            })?;
            entries.insert(id, entry);
        }

        Ok(CacheState {
            entries,
            sync_token: document.sync_token,
            next_page_token: document.next_page_token,
        })
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| CacheError::new(CacheErrorKind::Write(e.to_string())))
    }
}
