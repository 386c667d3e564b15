//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::time::Duration;

use super::WebPageDownloader;

/// How long [`WebPageDownloader::shutdown`] waits for in-flight downloads to unwind
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl WebPageDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new downloads (`Error::ShuttingDown`)
    /// 2. Signals cancellation to every in-flight download
    /// 3. Waits (up to 30 seconds) for them to reconcile and deregister
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Pages whose download was interrupted end up `Cancelled` and can be retried
    /// after restart.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.download_state
            .accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        let signalled = self.download_state.registry.cancel_all();
        tracing::info!(signalled, "Signalled cancellation to active downloads");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_active_downloads()).await {
            Ok(()) => {
                tracing::info!("All active downloads unwound");
            }
            Err(_) => {
                tracing::warn!(
                    remaining = self.download_state.registry.len(),
                    "Timeout waiting for downloads to unwind, proceeding with shutdown"
                );
            }
        }

        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether [`shutdown`](Self::shutdown) has begun
    pub fn is_shutting_down(&self) -> bool {
        !self
            .download_state
            .accepting_new
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Wait until the registry has drained
    async fn wait_for_active_downloads(&self) {
        loop {
            let active_count = self.download_state.registry.len();
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for active downloads to unwind");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
