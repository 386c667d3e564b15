//! Background service starters: downloaded-content recorder.

use crate::db::Database;
use crate::types::Event;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use super::WebPageDownloader;

impl WebPageDownloader {
    /// Start the downloaded-content recorder background task
    ///
    /// Persists the body carried by every [`Event::PageDownloaded`] into the
    /// `downloaded_pages` table. The task stops on [`Event::Shutdown`] or when the
    /// event channel closes.
    pub fn start_content_recorder(&self) -> tokio::task::JoinHandle<()> {
        // Subscribe before spawning so no event emitted after this call is missed
        let events = self.subscribe();
        let db = self.db.clone();

        let handle = tokio::spawn(record_downloaded_content(db, events));

        tracing::info!("Downloaded-content recorder started");

        handle
    }
}

async fn record_downloaded_content(db: Arc<Database>, mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(Event::PageDownloaded { id, content }) => {
                match db.insert_downloaded_page(id, &content).await {
                    Ok(record_id) => {
                        tracing::debug!(
                            page_id = %id,
                            record_id = %record_id,
                            bytes = content.len(),
                            "Recorded downloaded content"
                        );
                    }
                    Err(e) => {
                        tracing::error!(page_id = %id, error = %e, "Failed to record downloaded content");
                    }
                }
            }
            Ok(Event::Shutdown) | Err(RecvError::Closed) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Content recorder lagged, some bodies were not recorded");
            }
        }
    }

    tracing::debug!("Downloaded-content recorder stopped");
}
