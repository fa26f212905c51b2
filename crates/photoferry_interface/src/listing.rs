//! Library enumeration as a cache refresh source.

use crate::PhotoService;
use async_trait::async_trait;
use photoferry_cache::{RemoteItem, RemotePage, RemoteSource};
use photoferry_error::PhotoferryResult;
use std::sync::Arc;

/// Feeds [`PhotoService::list_media`] pages into an identity cache refresh.
#[derive(Clone)]
pub struct LibraryListing {
    service: Arc<dyn PhotoService>,
}

impl LibraryListing {
    /// Enumerate through `service`.
    pub fn new(service: Arc<dyn PhotoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RemoteSource for LibraryListing {
    async fn list_page(&self, page_token: Option<&str>) -> PhotoferryResult<RemotePage> {
        let page = self.service.list_media(page_token).await?;
        let without_id = page.items.iter().filter(|i| i.content_id.is_none()).count();
        if without_id > 0 {
            tracing::debug!(
                service = self.service.service_name(),
                count = without_id,
                "Library items without a usable content hash"
            );
        }
        Ok(RemotePage {
            items: page
                .items
                .into_iter()
                .map(|item| RemoteItem {
                    remote_ref: item.media_key,
                    content_id: item.content_id,
                })
                .collect(),
            next_page_token: page.next_page_token,
            sync_token: page.state_token,
        })
    }
}
