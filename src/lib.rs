//! # webpage-dl
//!
//! Tracked, cancellable, retrying web page download manager.
//!
//! Pages are registered by URL and downloaded on request. Every download runs
//! through the same pipeline: register a cancellation handle, mark the page
//! `InProgress`, fetch it (with per-attempt timeout and exponential backoff),
//! then settle on exactly one of `Completed`, `Cancelled` or `Error`.
//! Completed downloads publish an [`Event::PageDownloaded`] carrying the body.
//!
//! ## Quick Start
//!
//! ```no_run
//! use webpage_dl::{Config, DownloadOutcome, WebPageDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = WebPageDownloader::new(Config::default()).await?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let id = downloader.add_page("https://example.com").await?;
//!     if let DownloadOutcome::Completed { bytes, .. } = downloader.start_download(id).await? {
//!         println!("fetched {} bytes", bytes);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Stored page bodies
pub mod content_store;
/// Database persistence layer
pub mod db;
/// Download orchestration (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Page fetching and batch coordination
pub mod fetcher;
/// Active download registry and linked cancellation
pub mod registry;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use content_store::{ContentStore, FsContentStore};
pub use db::Database;
pub use downloader::WebPageDownloader;
pub use error::{ApiError, DatabaseError, DownloadError, Error, ErrorDetail, Result, ToHttpStatus};
pub use fetcher::{
    BatchFetcher, BatchOutcome, FetchError, FetchedPage, HttpFetcher, PageFetcher,
};
pub use registry::{ActiveDownloadRegistry, LinkedCancellation, RegistrationGuard};
pub use types::{DownloadOutcome, DownloadStatus, Event, Page, PageId, PageUrl};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use webpage_dl::{Config, WebPageDownloader, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = Arc::new(WebPageDownloader::new(Config::default()).await?);
///     let _api = downloader.spawn_api_server();
///
///     run_with_shutdown(&downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: &WebPageDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
