//! reqwest-backed page fetcher with timeout and retry

use super::{FetchError, FetchedPage, PageFetcher};
use crate::config::{Config, RetryConfig};
use crate::content_store::ContentStore;
use crate::error::Result;
use crate::retry::{RetryError, download_with_retry};
use crate::types::{PageId, PageUrl};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fetches pages with a single HTTP GET per attempt
pub struct HttpFetcher {
    client: reqwest::Client,
    store: Arc<dyn ContentStore>,
    retry: RetryConfig,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with explicit retry policy and per-attempt timeout
    pub fn new(store: Arc<dyn ContentStore>, retry: RetryConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("webpage-dl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            store,
            retry,
            timeout,
        })
    }

    /// Create a fetcher from the download and retry sections of `config`
    pub fn from_config(config: &Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        Self::new(store, config.retry.clone(), config.download.timeout)
    }

    /// One GET attempt bounded by the per-attempt timeout
    async fn get_once(&self, url: &PageUrl) -> std::result::Result<String, FetchError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout: self.timeout,
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        };

        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(classify)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_one(
        &self,
        id: PageId,
        url: &PageUrl,
        cancel: &CancellationToken,
    ) -> std::result::Result<FetchedPage, FetchError> {
        tracing::info!(page_id = %id, url = %url, "Downloading page");

        let body = download_with_retry(&self.retry, cancel, || self.get_once(url))
            .await
            .map_err(|e| match e {
                RetryError::Cancelled => FetchError::Cancelled,
                RetryError::Permanent(e) => e,
                RetryError::Exhausted { attempts, last } => FetchError::RetriesExhausted {
                    attempts,
                    source: Box::new(last),
                },
            })?;

        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        self.store
            .write(id, &body)
            .await
            .map_err(FetchError::Store)?;

        Ok(FetchedPage {
            id,
            bytes: body.len(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
