//! Download orchestration: start, start many, retry, cancel.
//!
//! Every download runs the same sequence: load the page, register a cancellation
//! handle, mark `InProgress`, fetch through the batch coordinator, reconcile the
//! outcome into a terminal status, and deregister. Deregistration is tied to a
//! guard so it also happens when the calling future is dropped.

use crate::error::{DownloadError, Error, Result};
use crate::fetcher::BatchOutcome;
use crate::registry::LinkedCancellation;
use crate::types::{DownloadOutcome, DownloadStatus, Event, Page, PageId};
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

use super::WebPageDownloader;

impl WebPageDownloader {
    /// Download a page
    ///
    /// Runs the full start sequence for `id` and waits for it to finish.
    ///
    /// # Returns
    ///
    /// - `Ok(DownloadOutcome::Completed { .. })` - page fetched, status `Completed`,
    ///   [`Event::PageDownloaded`] published
    /// - `Ok(DownloadOutcome::Cancelled { .. })` - cancellation observed, status `Cancelled`
    /// - `Err(Error::Download(DownloadError::NotFound { .. }))` - unknown page, nothing changed
    /// - `Err(Error::ShuttingDown)` - shutdown has begun, nothing changed
    /// - `Err(Error::Download(DownloadError::Failed { .. }))` - fetch failed, status `Error`
    /// - `Err(Error::Download(DownloadError::AlreadyDownloading { .. }))` - another
    ///   download of this page is in flight, nothing changed
    ///
    /// An attempt whose page is cancelled, requeued or deleted while it runs reports
    /// `Cancelled` and leaves the status that the other operation wrote.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use webpage_dl::*;
    /// # async fn example(downloader: WebPageDownloader) -> Result<()> {
    /// let id = downloader.add_page("https://example.com").await?;
    /// match downloader.start_download(id).await? {
    ///     DownloadOutcome::Completed { bytes, .. } => println!("fetched {} bytes", bytes),
    ///     DownloadOutcome::Cancelled { .. } => println!("cancelled"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_download(&self, id: PageId) -> Result<DownloadOutcome> {
        self.start_download_with_cancel(id, CancellationToken::new())
            .await
    }

    /// Download a page, additionally observing the caller's cancellation signal
    ///
    /// Firing `caller` cancels this download. [`cancel_download`](Self::cancel_download)
    /// cancels it without firing `caller`.
    pub async fn start_download_with_cancel(
        &self,
        id: PageId,
        caller: CancellationToken,
    ) -> Result<DownloadOutcome> {
        let page = self.load_page(id).await?;

        // Registered before the InProgress transition, so any cancel that can
        // observe InProgress finds the handle
        let handle = LinkedCancellation::new(caller);
        let Some(_registration) = self
            .download_state
            .registry
            .try_register_scoped(id, handle.clone())
        else {
            return Err(DownloadError::AlreadyDownloading { id }.into());
        };

        // Checked only once registered: shutdown flips the flag before cancel_all,
        // so a start that gets past here is always reached by cancel_all
        if !self.download_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        if !self
            .db
            .update_page_status(id, DownloadStatus::InProgress)
            .await?
        {
            return Err(DownloadError::NotFound { id }.into());
        }
        self.emit_event(Event::DownloadStarted { id });

        tracing::info!(page_id = %id, url = %page.url, "Download started");

        let outcome = self
            .batch
            .fetch_many(vec![(id, page.url.clone())], &handle.token())
            .await;

        self.reconcile(&page, &handle, outcome).await
    }

    /// Translate a fetch outcome into a terminal status, persist it, and notify
    async fn reconcile(
        &self,
        page: &Page,
        handle: &LinkedCancellation,
        outcome: BatchOutcome,
    ) -> Result<DownloadOutcome> {
        let id = page.id;

        if handle.is_cancelled() || outcome.was_cancelled() {
            if self.settle(id, DownloadStatus::Cancelled).await? {
                self.emit_event(Event::DownloadCancelled { id });
            }
            tracing::info!(page_id = %id, "Download cancelled");
            return Ok(DownloadOutcome::Cancelled { id });
        }

        let fetched = match outcome.into_result() {
            Ok(fetched) => fetched,
            Err(message) => return self.fail(id, message).await,
        };
        let bytes: usize = fetched.iter().map(|f| f.bytes).sum();

        let content = match self.content_store.read(id).await {
            Ok(content) => content,
            Err(e) => {
                return self
                    .fail(id, format!("failed to read stored content: {}", e))
                    .await;
            }
        };

        if !self.settle(id, DownloadStatus::Completed).await? {
            return Ok(superseded(id));
        }
        self.emit_event(Event::PageDownloaded { id, content });
        tracing::info!(page_id = %id, bytes, "Download completed");

        Ok(DownloadOutcome::Completed { id, bytes })
    }

    /// Mark `id` as `Error` and surface the joined failure text
    async fn fail(&self, id: PageId, message: String) -> Result<DownloadOutcome> {
        if !self.settle(id, DownloadStatus::Error).await? {
            return Ok(superseded(id));
        }
        self.emit_event(Event::DownloadFailed {
            id,
            error: message.clone(),
        });
        tracing::warn!(page_id = %id, error = %message, "Download failed");

        Err(DownloadError::Failed { id, message }.into())
    }

    /// Move `id` out of `InProgress` into `status`
    ///
    /// Returns `false` if the page left `InProgress` while the fetch ran (it was
    /// cancelled, requeued, overridden or deleted); its current status is kept.
    async fn settle(&self, id: PageId, status: DownloadStatus) -> Result<bool> {
        let settled = self
            .db
            .transition_page_status(id, DownloadStatus::InProgress, status)
            .await?;
        if !settled {
            tracing::debug!(page_id = %id, %status, "Page left InProgress during download; status kept");
        }
        Ok(settled)
    }

    /// Download several pages one after another
    ///
    /// Each page runs the full [`start_download`](Self::start_download) sequence; a
    /// failure does not stop the pages after it. Outcomes are returned in input order.
    pub async fn start_downloads(&self, ids: &[PageId]) -> Vec<(PageId, Result<DownloadOutcome>)> {
        self.start_downloads_with_cancel(ids, CancellationToken::new())
            .await
    }

    /// [`start_downloads`](Self::start_downloads) observing the caller's cancellation signal
    pub async fn start_downloads_with_cancel(
        &self,
        ids: &[PageId],
        caller: CancellationToken,
    ) -> Vec<(PageId, Result<DownloadOutcome>)> {
        let mut outcomes = Vec::with_capacity(ids.len());

        for &id in ids {
            let result = self.start_download_with_cancel(id, caller.clone()).await;
            if let Err(e) = &result {
                tracing::debug!(page_id = %id, error = %e, "Batch item did not complete");
            }
            outcomes.push((id, result));
        }

        outcomes
    }

    /// Retry a download
    ///
    /// Runs the whole start sequence again from any status; nothing from a previous
    /// attempt is resumed.
    pub async fn retry_download(&self, id: PageId) -> Result<DownloadOutcome> {
        tracing::info!(page_id = %id, "Retrying download");
        self.start_download(id).await
    }

    /// [`retry_download`](Self::retry_download) observing the caller's cancellation signal
    pub async fn retry_download_with_cancel(
        &self,
        id: PageId,
        caller: CancellationToken,
    ) -> Result<DownloadOutcome> {
        tracing::info!(page_id = %id, "Retrying download");
        self.start_download_with_cancel(id, caller).await
    }

    /// Cancel a download
    ///
    /// Marks the page `Cancelled`, then signals the in-flight fetch for `id` if there
    /// is one. Cancelling a page with nothing in flight is not an error, and
    /// [`Event::DownloadCancelled`] is published only when the status changed.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::NotFound` if the page doesn't exist.
    pub async fn cancel_download(&self, id: PageId) -> Result<()> {
        self.load_page(id).await?;

        // Status first: the signalled download then finds the page out of
        // InProgress and publishes nothing of its own
        let changed = self.db.mark_page_cancelled(id).await?;
        let was_active = self.download_state.registry.cancel(id);

        if changed {
            self.emit_event(Event::DownloadCancelled { id });
        }

        tracing::info!(page_id = %id, was_active, "Download cancelled by request");
        Ok(())
    }

    /// Load a page or fail with `DownloadError::NotFound`
    pub(crate) async fn load_page(&self, id: PageId) -> Result<Page> {
        self.db
            .get_page(id)
            .await?
            .ok_or_else(|| DownloadError::NotFound { id }.into())
    }
}

/// Outcome of an attempt whose page was moved on by someone else
fn superseded(id: PageId) -> DownloadOutcome {
    tracing::info!(page_id = %id, "Download superseded before it could settle");
    DownloadOutcome::Cancelled { id }
}
