//! Test configuration helpers for creating downloaders backed by real HTTP

use std::time::Duration;
use tempfile::TempDir;
use webpage_dl::{Config, WebPageDownloader};

/// Config rooted in `dir` with retry delays short enough for tests
///
/// Keeps the production attempt budget (3 retries, 4 attempts) and the
/// doubling backoff, scaled down from seconds to milliseconds.
pub fn fast_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = dir.path().join("webpage-dl.db");
    config.download.content_dir = dir.path().join("content");
    config.download.timeout = Duration::from_secs(5);
    config.retry.initial_delay = Duration::from_millis(10);
    config.retry.max_delay = Duration::from_millis(100);
    config
}

/// Create a downloader using the reqwest fetcher and [`fast_config`]
///
/// Returns the downloader and the tempdir (which must be kept alive).
pub async fn create_http_downloader() -> (WebPageDownloader, TempDir) {
    create_http_downloader_with(|_| {}).await
}

/// Like [`create_http_downloader`], with `customize` applied to the config first
pub async fn create_http_downloader_with(
    customize: impl FnOnce(&mut Config),
) -> (WebPageDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(&temp_dir);
    customize(&mut config);
    let downloader = WebPageDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}
