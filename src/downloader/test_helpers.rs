//! Shared test helpers for creating WebPageDownloader instances in tests.

use crate::config::Config;
use crate::content_store::{ContentStore, FsContentStore};
use crate::downloader::WebPageDownloader;
use crate::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::types::{PageId, PageUrl};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Behavior of [`ScriptedFetcher`] for one URL
#[derive(Clone, Debug)]
pub(crate) enum Script {
    /// Store `body` and succeed
    Succeed(String),
    /// Report success without storing anything
    SucceedUnstored,
    /// Fail with the given HTTP status (as if retries were exhausted)
    Fail(u16),
    /// Block until cancelled
    Hang,
    /// Store `body`, then wait for [`ScriptedFetcher::release`] without watching cancellation
    Gated(String),
}

/// In-process [`PageFetcher`] driven by per-URL scripts
pub(crate) struct ScriptedFetcher {
    store: Arc<dyn ContentStore>,
    scripts: Mutex<HashMap<String, Script>>,
    calls: AtomicUsize,
    /// Notified each time a [`Script::Hang`] or [`Script::Gated`] fetch begins blocking
    pub(crate) started: Notify,
    /// Lets one [`Script::Gated`] fetch finish
    pub(crate) release: Notify,
}

impl ScriptedFetcher {
    pub(crate) fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Set the behavior for `url` (unscripted URLs succeed with `<html>ok</html>`)
    pub(crate) fn script(&self, url: &str, script: Script) {
        self.scripts.lock().unwrap().insert(url.to_string(), script);
    }

    /// Number of fetches started so far
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_one(
        &self,
        id: PageId,
        url: &PageUrl,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Script::Succeed("<html>ok</html>".to_string()));

        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        match script {
            Script::Succeed(body) => {
                self.store.write(id, &body).await.map_err(FetchError::Store)?;
                Ok(FetchedPage {
                    id,
                    bytes: body.len(),
                })
            }
            Script::SucceedUnstored => Ok(FetchedPage { id, bytes: 0 }),
            Script::Fail(status) => Err(FetchError::RetriesExhausted {
                attempts: 4,
                source: Box::new(FetchError::Status {
                    url: url.to_string(),
                    status,
                }),
            }),
            Script::Hang => {
                self.started.notify_one();
                cancel.cancelled().await;
                Err(FetchError::Cancelled)
            }
            Script::Gated(body) => {
                self.store.write(id, &body).await.map_err(FetchError::Store)?;
                self.started.notify_one();
                self.release.notified().await;
                Ok(FetchedPage {
                    id,
                    bytes: body.len(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Build a test config rooted in `dir`
pub(crate) fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = dir.join("test.db");
    config.download.content_dir = dir.join("content");
    config
}

/// Helper to create a test WebPageDownloader backed by a [`ScriptedFetcher`].
/// Returns the downloader, the fetcher, and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (
    WebPageDownloader,
    Arc<ScriptedFetcher>,
    tempfile::TempDir,
) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path());

    let store: Arc<dyn ContentStore> = Arc::new(FsContentStore::new(config.content_dir().clone()));
    let fetcher = Arc::new(ScriptedFetcher::new(store.clone()));

    let downloader = WebPageDownloader::with_fetcher(config, fetcher.clone(), store)
        .await
        .unwrap();

    (downloader, fetcher, temp_dir)
}
