//! Active download registry
//!
//! Maps a page ID to the cancellation handle of its in-flight download. The
//! registry is an explicitly constructed value owned by the downloader; there is
//! no process-global state. All operations take a short, non-async lock and never
//! touch I/O, so they are safe to call from any task and from `Drop`.

use crate::types::PageId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Cancellation handle linking a caller's signal with an internally owned one
///
/// The download observes [`token`](Self::token), which fires when either side
/// fires. [`cancel`](Self::cancel) fires only the internal side, so cancelling a
/// download never cancels the caller's wider operation.
#[derive(Clone, Debug)]
pub struct LinkedCancellation {
    external: CancellationToken,
    internal: CancellationToken,
}

impl LinkedCancellation {
    /// Link a new internal trigger to the caller's token
    pub fn new(external: CancellationToken) -> Self {
        let internal = external.child_token();
        Self { external, internal }
    }

    /// Handle with no caller-side signal
    pub fn detached() -> Self {
        Self::new(CancellationToken::new())
    }

    /// Whether either the caller or the internal trigger has fired
    pub fn is_cancelled(&self) -> bool {
        self.internal.is_cancelled() || self.external.is_cancelled()
    }

    /// Fire the internal trigger
    pub fn cancel(&self) {
        self.internal.cancel();
    }

    /// Combined token handed to the fetch layer
    pub fn token(&self) -> CancellationToken {
        self.internal.clone()
    }

    /// Wait until either side fires
    pub async fn cancelled(&self) {
        self.internal.cancelled().await;
    }
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    handle: LinkedCancellation,
}

/// Concurrent store of in-flight downloads (cloneable; clones share state)
#[derive(Clone, Debug, Default)]
pub struct ActiveDownloadRegistry {
    downloads: Arc<Mutex<HashMap<PageId, Entry>>>,
    next_generation: Arc<AtomicU64>,
}

impl ActiveDownloadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageId, Entry>> {
        // The map holds no invariants a panicking holder could break
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, handle: LinkedCancellation) -> Entry {
        Entry {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            handle,
        }
    }

    /// Insert or replace the handle for `id` (last writer wins)
    ///
    /// Returns the replaced handle, if any.
    pub fn register(&self, id: PageId, handle: LinkedCancellation) -> Option<LinkedCancellation> {
        let entry = self.entry(handle);
        let replaced = self.lock().insert(id, entry).map(|e| e.handle);
        if replaced.is_some() {
            tracing::debug!(page_id = %id, "Replaced existing active download entry");
        }
        replaced
    }

    /// Atomically remove and return the handle for `id`
    pub fn try_remove(&self, id: PageId) -> Option<LinkedCancellation> {
        self.lock().remove(&id).map(|e| e.handle)
    }

    /// Remove the handle for `id` and fire it
    ///
    /// Returns `true` if an in-flight download was found.
    pub fn cancel(&self, id: PageId) -> bool {
        match self.try_remove(id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Fire every registered handle without removing it
    ///
    /// Each download removes its own entry as it unwinds. Returns the number signalled.
    pub fn cancel_all(&self) -> usize {
        let downloads = self.lock();
        for (id, entry) in downloads.iter() {
            tracing::debug!(page_id = %id, "Signalling cancellation");
            entry.handle.cancel();
        }
        downloads.len()
    }

    /// Whether a download for `id` is in flight
    pub fn contains(&self, id: PageId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of in-flight downloads
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no download is in flight
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Register `handle` unless `id` already has an in-flight download
    ///
    /// The check and the insert happen under one lock. The returned guard
    /// removes this registration when dropped: on success, on error, and when
    /// the owning future is dropped mid-flight. It leaves alone any later
    /// registration for the same `id`.
    pub fn try_register_scoped(
        &self,
        id: PageId,
        handle: LinkedCancellation,
    ) -> Option<RegistrationGuard> {
        let entry = self.entry(handle);
        let generation = entry.generation;

        let mut downloads = self.lock();
        if downloads.contains_key(&id) {
            return None;
        }
        downloads.insert(id, entry);

        Some(RegistrationGuard {
            registry: self.clone(),
            id,
            generation,
        })
    }

    fn remove_generation(&self, id: PageId, generation: u64) {
        let mut downloads = self.lock();
        if downloads
            .get(&id)
            .is_some_and(|entry| entry.generation == generation)
        {
            downloads.remove(&id);
        }
    }
}

/// Removes its own registry entry on drop
#[must_use = "dropping the guard immediately deregisters the download"]
#[derive(Debug)]
pub struct RegistrationGuard {
    registry: ActiveDownloadRegistry,
    id: PageId,
    generation: u64,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.remove_generation(self.id, self.generation);
    }
}
