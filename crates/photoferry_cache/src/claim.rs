//! Per-key upload claims.

use photoferry_core::ContentId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

type ClaimMap = HashMap<ContentId, Arc<tokio::sync::Mutex<()>>>;

/// Registry of in-flight claims, one async mutex per content identifier.
#[derive(Debug, Default)]
pub(crate) struct ClaimRegistry {
    slots: Arc<Mutex<ClaimMap>>,
}

impl ClaimRegistry {
    pub(crate) async fn claim(&self, id: ContentId) -> ClaimGuard {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slots.entry(id).or_default().clone()
        };
        let contended = slot.try_lock().is_err();
        if contended {
            tracing::debug!(content_id = %id, "Waiting for concurrent claim");
        }
        let guard = slot.lock_owned().await;
        ClaimGuard {
            id,
            slots: Arc::clone(&self.slots),
            _guard: Some(guard),
        }
    }

    pub(crate) fn active(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

/// Exclusive right to resolve one content identifier.
///
/// While a guard is held, no other worker can claim the same identifier. A
/// worker that waited for a claim must re-check the cache, since the previous
/// holder may have recorded a reference in the meantime.
#[derive(Debug)]
pub struct ClaimGuard {
    id: ContentId,
    slots: Arc<Mutex<ClaimMap>>,
    _guard: Option<OwnedMutexGuard<()>>,
}

impl ClaimGuard {
    /// The claimed identifier.
    pub fn content_id(&self) -> &ContentId {
        &self.id
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one inside our guard: nobody is waiting.
        if let Some(slot) = slots.get(&self.id)
            && Arc::strong_count(slot) <= 2
        {
            slots.remove(&self.id);
        }
        self._guard.take();
    }
}
