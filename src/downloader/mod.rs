//! Core downloader implementation split into focused submodules.
//!
//! The `WebPageDownloader` struct and its methods are organized by domain:
//! - [`control`] - Download orchestration (start, start many, retry, cancel)
//! - [`pages`] - Tracked page management (add, update, delete)
//! - [`lifecycle`] - Shutdown coordination
//! - [`services`] - Background service starters

mod control;
mod lifecycle;
mod pages;
mod services;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::content_store::{ContentStore, FsContentStore};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::fetcher::{BatchFetcher, HttpFetcher, PageFetcher};
use crate::registry::ActiveDownloadRegistry;
use crate::types::Event;

/// In-flight download tracking
#[derive(Clone)]
pub(crate) struct DownloadState {
    /// Page ID to cancellation handle for every fetch in flight
    pub(crate) registry: ActiveDownloadRegistry,
    /// Flag to indicate whether new downloads are accepted (set to false during shutdown)
    pub(crate) accepting_new: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct WebPageDownloader {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests to query page status
    pub db: std::sync::Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: std::sync::Arc<Config>,
    /// Bounded-parallelism fetch coordinator
    pub(crate) batch: BatchFetcher,
    /// Where fetched bodies live between fetch and reconciliation
    pub(crate) content_store: std::sync::Arc<dyn ContentStore>,
    /// In-flight download tracking
    pub(crate) download_state: DownloadState,
}

impl WebPageDownloader {
    /// Create a new WebPageDownloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Opens/creates the SQLite database and runs migrations
    /// - Creates the content directory and the HTTP fetcher
    /// - Sets up the event broadcast channel
    /// - Starts the downloaded-content recorder when enabled
    pub async fn new(config: Config) -> Result<Self> {
        let store: std::sync::Arc<dyn ContentStore> =
            std::sync::Arc::new(FsContentStore::new(config.content_dir().clone()));
        let fetcher = std::sync::Arc::new(HttpFetcher::from_config(&config, store.clone())?);

        Self::with_fetcher(config, fetcher, store).await
    }

    /// Create a downloader that fetches through a custom [`PageFetcher`]
    ///
    /// `store` must be the store `fetcher` writes into; the downloader reads
    /// fetched bodies back from it during reconciliation.
    pub async fn with_fetcher(
        config: Config,
        fetcher: std::sync::Arc<dyn PageFetcher>,
        store: std::sync::Arc<dyn ContentStore>,
    ) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.content_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create content directory '{}': {}",
                        config.content_dir().display(),
                        e
                    ),
                ))
            })?;

        let db = Database::new(&config.persistence.database_path).await?;

        // Create broadcast channel with buffer size of 1000 events
        // This allows multiple subscribers to receive all events independently
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        tracing::info!(
            fetcher = fetcher.name(),
            content_store = store.name(),
            max_concurrent = config.download.max_concurrent_downloads,
            "Page fetcher initialized"
        );

        let batch = BatchFetcher::new(fetcher, config.download.max_concurrent_downloads);

        let download_state = DownloadState {
            registry: ActiveDownloadRegistry::new(),
            accepting_new: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true)),
        };

        let downloader = Self {
            db: std::sync::Arc::new(db),
            event_tx,
            config: std::sync::Arc::new(config),
            batch,
            content_store: store,
            download_state,
        };

        if downloader.config.persistence.record_downloaded_content {
            downloader.start_content_recorder();
        }

        Ok(downloader)
    }

    /// Subscribe to page events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use webpage_dl::{WebPageDownloader, Config, Event};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = WebPageDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             if let Event::PageDownloaded { id, content } = event {
    ///                 println!("{}: {} bytes", id, content.len());
    ///             }
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> std::sync::Arc<Config> {
        std::sync::Arc::clone(&self.config)
    }

    /// Number of downloads currently in flight
    pub fn active_download_count(&self) -> usize {
        self.download_state.registry.len()
    }

    /// Whether a download for `id` is currently in flight
    pub fn is_downloading(&self, id: crate::types::PageId) -> bool {
        self.download_state.registry.contains(id)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on the configured bind address (default: 127.0.0.1:6790).
    pub fn spawn_api_server(self: &std::sync::Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
