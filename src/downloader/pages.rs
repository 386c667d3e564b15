//! Tracked page management: add, query, update, delete.

use crate::error::{DownloadError, Error, Result};
use crate::types::{DownloadStatus, Event, Page, PageId, PageUrl};

use super::WebPageDownloader;

impl WebPageDownloader {
    /// Start tracking a page
    ///
    /// The URL must be absolute, non-empty, and use `http` or `https`; anything else
    /// is rejected with `Error::Validation` before the page is stored. New pages
    /// start in `Queued`.
    pub async fn add_page(&self, url: &str) -> Result<PageId> {
        let url = PageUrl::parse(url)?;
        let page = Page::new(url);

        self.db.insert_page(&page).await?;

        self.emit_event(Event::Queued {
            id: page.id,
            url: page.url.to_string(),
        });
        tracing::info!(page_id = %page.id, url = %page.url, "Page added");

        Ok(page.id)
    }

    /// Get a page by ID
    pub async fn get_page(&self, id: PageId) -> Result<Page> {
        self.load_page(id).await
    }

    /// List every tracked page, oldest first
    pub async fn list_pages(&self) -> Result<Vec<Page>> {
        self.db.list_pages().await
    }

    /// Point a page at a new URL
    ///
    /// The page goes back to `Queued`; an in-flight download for the old URL is
    /// cancelled.
    pub async fn update_page_url(&self, id: PageId, url: &str) -> Result<Page> {
        let url = PageUrl::parse(url)?;
        let mut page = self.load_page(id).await?;

        // Written before cancelling so the unwinding download finds the page
        // already out of InProgress and leaves it Queued
        page.set_url(url);
        if !self.db.update_page(&page).await? {
            return Err(DownloadError::NotFound { id }.into());
        }

        if self.download_state.registry.cancel(id) {
            tracing::debug!(page_id = %id, "Cancelled in-flight download for previous URL");
        }

        tracing::info!(page_id = %id, url = %page.url, "Page URL updated");
        Ok(page)
    }

    /// Override a page's status
    ///
    /// `NotSet` is an uninitialized sentinel and is rejected.
    pub async fn update_page_status(&self, id: PageId, status: DownloadStatus) -> Result<Page> {
        if status == DownloadStatus::NotSet {
            return Err(Error::Validation(
                "status must not be not_set".to_string(),
            ));
        }

        let mut page = self.load_page(id).await?;
        page.set_status(status);
        if !self.db.update_page(&page).await? {
            return Err(DownloadError::NotFound { id }.into());
        }

        tracing::info!(page_id = %id, %status, "Page status updated");
        Ok(page)
    }

    /// Stop tracking a page
    ///
    /// Cancels any in-flight download, removes the stored body, and deletes the page
    /// together with its recorded content.
    pub async fn delete_page(&self, id: PageId) -> Result<()> {
        self.load_page(id).await?;

        if self.download_state.registry.cancel(id) {
            tracing::debug!(page_id = %id, "Cancelled in-flight download before delete");
        }

        if let Err(e) = self.content_store.remove(id).await {
            tracing::warn!(page_id = %id, error = %e, "Failed to remove stored content");
        }

        if !self.db.delete_page(id).await? {
            return Err(DownloadError::NotFound { id }.into());
        }

        self.emit_event(Event::PageRemoved { id });
        tracing::info!(page_id = %id, "Page deleted");
        Ok(())
    }
}
