//! Identity cache implementation.

use crate::claim::{ClaimGuard, ClaimRegistry};
use crate::document::{CacheDocument, CacheState};
use photoferry_core::{CacheEntry, CacheOrigin, ContentId, RemoteRef};
use photoferry_error::{CacheError, CacheErrorKind, PhotoferryResult};
use photoferry_storage::{CacheStore, MemoryStore};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result of recording a reference for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The identifier was not cached before
    Inserted,
    /// The same reference was already cached; nothing changed
    Unchanged,
    /// A different reference was replaced
    Reconciled {
        /// The reference that was overwritten
        previous: RemoteRef,
    },
}

/// Persisted cache state could not be used and the cache started empty.
#[derive(Debug, Clone, derive_more::Display)]
#[display("identity cache at {} reset to empty: {}", store, error)]
pub struct CacheLoadWarning {
    /// Location of the unusable state
    pub store: String,
    /// What was wrong with it
    pub error: CacheError,
}

/// Entry counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached identifiers
    pub entries: usize,
    /// Entries per origin
    pub by_origin: BTreeMap<CacheOrigin, usize>,
    /// Last library state token, if a refresh has run
    pub sync_token: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Tokens {
    pub sync_token: Option<String>,
    pub next_page_token: Option<String>,
}

/// Concurrent, persistent map from content identity to remote reference.
///
/// Reads take a shared lock; every mutation funnels through one write path,
/// so an identifier never maps to more than one reference at a time.
/// Uploaders additionally [`claim`](IdentityCache::claim) an identifier
/// before resolving it, which keeps two workers from uploading the same
/// content concurrently.
///
/// # Example
///
/// ```
/// use photoferry_cache::{IdentityCache, InsertOutcome};
/// use photoferry_core::{CacheOrigin, ContentId, RemoteRef};
///
/// let cache = IdentityCache::in_memory();
/// let id = ContentId::from_bytes([9; 20]);
/// let key = RemoteRef::new("media-key").unwrap();
///
/// assert_eq!(cache.insert(id, key.clone(), CacheOrigin::Uploaded), InsertOutcome::Inserted);
/// assert_eq!(cache.insert(id, key.clone(), CacheOrigin::Uploaded), InsertOutcome::Unchanged);
/// assert_eq!(cache.lookup(&id), Some(key));
/// ```
pub struct IdentityCache {
    entries: RwLock<HashMap<ContentId, CacheEntry>>,
    pub(crate) tokens: RwLock<Tokens>,
    claims: ClaimRegistry,
    store: Arc<dyn CacheStore>,
    dirty: AtomicBool,
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("entries", &self.len())
            .field("store", &self.store.describe())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl IdentityCache {
    /// Load the cache from `store`.
    ///
    /// Never fails: unreadable or corrupt state yields an empty cache and a
    /// [`CacheLoadWarning`] describing what was discarded. A store with no
    /// document yet is not a warning.
    #[tracing::instrument(skip(store), fields(store = %store.describe()))]
    pub async fn open(store: Arc<dyn CacheStore>) -> (Self, Option<CacheLoadWarning>) {
        let loaded = match store.load().await {
            Ok(Some(bytes)) => CacheDocument::decode(&bytes),
            Ok(None) => Ok(CacheState::default()),
            Err(e) => Err(CacheError::new(CacheErrorKind::Read(e.to_string()))),
        };

        let (state, warning) = match loaded {
            Ok(state) => (state, None),
            Err(error) => {
                let warning = CacheLoadWarning {
                    store: store.describe(),
                    error,
                };
                tracing::warn!(%warning, "Discarding unusable cache state");
                (CacheState::default(), Some(warning))
            }
        };

        tracing::info!(entries = state.entries.len(), "Identity cache loaded");
        let cache = Self {
            entries: RwLock::new(state.entries),
            tokens: RwLock::new(Tokens {
                sync_token: state.sync_token,
                next_page_token: state.next_page_token,
            }),
            claims: ClaimRegistry::default(),
            store,
            dirty: AtomicBool::new(false),
        };
        (cache, warning)
    }

    /// An empty cache backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            tokens: RwLock::new(Tokens::default()),
            claims: ClaimRegistry::default(),
            store: Arc::new(MemoryStore::new()),
            dirty: AtomicBool::new(false),
        }
    }

    /// The cached reference for `id`, without side effects.
    pub fn lookup(&self, id: &ContentId) -> Option<RemoteRef> {
        self.read_entries().get(id).map(|e| e.remote_ref().clone())
    }

    /// The full cached entry for `id`.
    pub fn entry(&self, id: &ContentId) -> Option<CacheEntry> {
        self.read_entries().get(id).cloned()
    }

    /// Record `remote_ref` for `id`.
    ///
    /// Recording the reference already cached is a no-op and keeps the
    /// original origin and timestamp. A different reference overwrites the
    /// old one and is logged as a reconciliation.
    pub fn insert(&self, id: ContentId, remote_ref: RemoteRef, origin: CacheOrigin) -> InsertOutcome {
        self.write_entries(|entries| {
            let outcome = record(entries, id, remote_ref, origin);
            let changed = outcome != InsertOutcome::Unchanged;
            (outcome, changed)
        })
    }

    /// Wait for exclusive rights to resolve `id`.
    pub async fn claim(&self, id: ContentId) -> ClaimGuard {
        self.claims.claim(id).await
    }

    /// Number of identifiers currently claimed or awaited.
    pub fn active_claims(&self) -> usize {
        self.claims.active()
    }

    /// Number of cached identifiers.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// True if there are changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Library state token from the last completed enumeration.
    pub fn sync_token(&self) -> Option<String> {
        self.read_tokens().sync_token.clone()
    }

    /// Page token where an interrupted enumeration stopped.
    pub fn next_page_token(&self) -> Option<String> {
        self.read_tokens().next_page_token.clone()
    }

    /// Entry counts by origin.
    pub fn stats(&self) -> CacheStats {
        let entries = self.read_entries();
        let mut by_origin = BTreeMap::new();
        for entry in entries.values() {
            *by_origin.entry(*entry.origin()).or_insert(0) += 1;
        }
        CacheStats {
            entries: entries.len(),
            by_origin,
            sync_token: self.sync_token(),
        }
    }

    /// Write the current state to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or the store
    /// rejects the write. The cache stays dirty in that case.
    #[tracing::instrument(skip(self), fields(store = %self.store.describe()))]
    pub async fn persist(&self) -> PhotoferryResult<()> {
        self.dirty.store(false, Ordering::Release);
        let document = {
            let entries = self.read_entries();
            let tokens = self.read_tokens();
            CacheDocument::from_state(
                &entries,
                tokens.sync_token.clone(),
                tokens.next_page_token.clone(),
            )
        };

        let result = match document.encode() {
            Ok(bytes) => self.store.save(&bytes).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                tracing::info!(entries = self.len(), "Identity cache persisted");
                Ok(())
            }
            Err(e) => {
                self.mark_dirty();
                tracing::warn!(error = %e, "Failed to persist identity cache");
                Err(e)
            }
        }
    }

    /// Persist only if something changed since the last save.
    ///
    /// Returns whether a write happened.
    pub async fn persist_if_dirty(&self) -> PhotoferryResult<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    pub(crate) fn set_tokens(&self, sync_token: Option<String>, next_page_token: Option<String>) {
        let mut tokens = self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(sync) = sync_token {
            tokens.sync_token = Some(sync);
        }
        tokens.next_page_token = next_page_token;
        drop(tokens);
        self.mark_dirty();
    }

    /// The single synchronized mutation path.
    ///
    /// `mutate` returns its result and whether the map changed.
    pub(crate) fn write_entries<R>(
        &self,
        mutate: impl FnOnce(&mut HashMap<ContentId, CacheEntry>) -> (R, bool),
    ) -> R {
        let mut entries: RwLockWriteGuard<'_, _> = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (result, changed) = mutate(&mut entries);
        drop(entries);
        if changed {
            self.mark_dirty();
        }
        result
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<ContentId, CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_tokens(&self) -> RwLockReadGuard<'_, Tokens> {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Apply one insert to the locked map.
pub(crate) fn record(
    entries: &mut HashMap<ContentId, CacheEntry>,
    id: ContentId,
    remote_ref: RemoteRef,
    origin: CacheOrigin,
) -> InsertOutcome {
    match entries.get(&id) {
        Some(existing) if *existing.remote_ref() == remote_ref => {
            tracing::debug!(content_id = %id, remote_ref = %remote_ref, "Cache entry unchanged");
            InsertOutcome::Unchanged
        }
        Some(existing) => {
            let previous = existing.remote_ref().clone();
            tracing::warn!(
                content_id = %id,
                previous = %previous,
                current = %remote_ref,
                origin = %origin,
                "Reconciled cache entry"
            );
            entries.insert(id, CacheEntry::new(remote_ref, origin));
            InsertOutcome::Reconciled { previous }
        }
        None => {
            tracing::debug!(content_id = %id, remote_ref = %remote_ref, origin = %origin, "Cached reference");
            entries.insert(id, CacheEntry::new(remote_ref, origin));
            InsertOutcome::Inserted
        }
    }
}
