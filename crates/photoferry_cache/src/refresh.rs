//! Bulk refresh from the remote library.

use crate::IdentityCache;
use crate::cache::{InsertOutcome, record};
use photoferry_core::{CacheOrigin, ContentId, RemoteRef};
use photoferry_error::PhotoferryResult;
use serde::Serialize;
use std::collections::HashSet;

/// One object in a library enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Media key of the stored object
    pub remote_ref: RemoteRef,
    /// Content identity, when the service reported a usable dedup key
    pub content_id: Option<ContentId>,
}

/// One page of a library enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePage {
    /// Objects on this page
    pub items: Vec<RemoteItem>,
    /// Token for the following page; `None` or empty on the last page
    pub next_page_token: Option<String>,
    /// Library state token
    pub sync_token: Option<String>,
}

/// Authoritative enumeration of remotely stored objects.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the page starting at `page_token`, or the first page.
    async fn list_page(&self, page_token: Option<&str>) -> PhotoferryResult<RemotePage>;
}

/// How enumerated objects combine with existing entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
pub enum RefreshMode {
    /// Add and reconcile, never remove. Resumes an interrupted enumeration.
    #[default]
    #[display("merge")]
    Merge,
    /// Enumerate from the start and drop entries the library no longer has
    #[display("replace")]
    Replace,
}

/// Counts from one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Pages fetched
    pub pages: usize,
    /// Items with a content identity
    pub seen: usize,
    /// Identifiers newly cached
    pub added: usize,
    /// Entries whose reference changed
    pub reconciled: usize,
    /// Entries dropped by [`RefreshMode::Replace`]
    pub removed: usize,
}

impl IdentityCache {
    /// Merge or replace the cache from a full enumeration of `source`.
    ///
    /// Pages are fetched until the next-page token is empty or repeats. The
    /// enumeration's position is recorded after every page, so a failed
    /// merge resumes where it stopped. Replace removes entries only after
    /// the enumeration completes.
    ///
    /// # Errors
    ///
    /// Returns the first error from `source`. Entries recorded from earlier
    /// pages are kept.
    #[tracing::instrument(skip(self, source), fields(mode = %mode))]
    pub async fn refresh(
        &self,
        source: &dyn RemoteSource,
        mode: RefreshMode,
    ) -> PhotoferryResult<RefreshSummary> {
        let mut summary = RefreshSummary::default();
        let mut listed: HashSet<ContentId> = HashSet::new();
        let mut visited_tokens: HashSet<String> = HashSet::new();

        let mut token = match mode {
            RefreshMode::Merge => self.next_page_token(),
            RefreshMode::Replace => None,
        };
        if let Some(resume) = &token {
            tracing::info!(page_token = %resume, "Resuming interrupted enumeration");
            visited_tokens.insert(resume.clone());
        }

        loop {
            let page = source.list_page(token.as_deref()).await?;
            summary.pages += 1;

            let items: Vec<(ContentId, RemoteRef)> = page
                .items
                .into_iter()
                .filter_map(|item| item.content_id.map(|id| (id, item.remote_ref)))
                .collect();
            summary.seen += items.len();

            let outcomes = self.write_entries(|entries| {
                let outcomes: Vec<InsertOutcome> = items
                    .iter()
                    .map(|(id, remote_ref)| {
                        record(entries, *id, remote_ref.clone(), CacheOrigin::Refresh)
                    })
                    .collect();
                let changed = outcomes.iter().any(|o| *o != InsertOutcome::Unchanged);
                (outcomes, changed)
            });
            for outcome in outcomes {
                match outcome {
                    InsertOutcome::Inserted => summary.added += 1,
                    InsertOutcome::Reconciled { .. } => summary.reconciled += 1,
                    InsertOutcome::Unchanged => {}
                }
            }
            listed.extend(items.into_iter().map(|(id, _)| id));

            let next = page.next_page_token.filter(|t| !t.is_empty());
            tracing::debug!(
                page = summary.pages,
                seen = summary.seen,
                has_next = next.is_some(),
                "Fetched library page"
            );

            match next {
                Some(next) if !visited_tokens.insert(next.clone()) => {
                    tracing::warn!(page_token = %next, "Page token repeated, stopping enumeration");
                    self.set_tokens(page.sync_token, None);
                    break;
                }
                Some(next) => {
                    self.set_tokens(page.sync_token, Some(next.clone()));
                    token = Some(next);
                }
                None => {
                    self.set_tokens(page.sync_token, None);
                    break;
                }
            }
        }

        if mode == RefreshMode::Replace {
            summary.removed = self.write_entries(|entries| {
                let before = entries.len();
                entries.retain(|id, _| listed.contains(id));
                let removed = before - entries.len();
                (removed, removed > 0)
            });
        }

        tracing::info!(
            pages = summary.pages,
            seen = summary.seen,
            added = summary.added,
            reconciled = summary.reconciled,
            removed = summary.removed,
            "Identity cache refreshed"
        );
        Ok(summary)
    }
}
