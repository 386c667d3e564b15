//! Page fetching
//!
//! - [`PageFetcher`] - one page, one URL, with retry; writes the body to a [`ContentStore`]
//! - [`HttpFetcher`] - reqwest-backed implementation
//! - [`BatchFetcher`] - runs many fetches under a per-batch concurrency gate
//!
//! Nothing in this module knows about page status; reconciliation belongs to the
//! downloader.
//!
//! [`ContentStore`]: crate::content_store::ContentStore

use crate::retry::IsRetryable;
use crate::types::{PageId, PageUrl};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

mod batch;
mod http;

pub use batch::{BatchFetcher, BatchOutcome};
pub use http::HttpFetcher;

/// A page body that was fetched and stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedPage {
    /// Page the body belongs to
    pub id: PageId,
    /// Size of the stored body in bytes
    pub bytes: usize,
}

/// Errors from a single page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch observed cancellation
    #[error("download cancelled")]
    Cancelled,

    /// One attempt exceeded the per-attempt timeout
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL
        url: String,
        /// Per-attempt timeout that elapsed
        timeout: Duration,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Connection, TLS or body transfer failure
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Fetched body could not be written to the content store
    #[error("failed to store content: {0}")]
    Store(#[source] std::io::Error),

    /// Every attempt failed with a retryable error
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Total attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        source: Box<FetchError>,
    },
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            // Server-side failures, request timeout and throttling are transient;
            // other client errors will not change on retry
            FetchError::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            FetchError::Cancelled
            | FetchError::Store(_)
            | FetchError::RetriesExhausted { .. } => false,
        }
    }
}

/// Fetches one page and stores its body under the page ID
///
/// Implementations must honor `cancel`: stop retrying and return
/// [`FetchError::Cancelled`] as soon as it fires.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and store the body under `id`
    async fn fetch_one(
        &self,
        id: PageId,
        url: &PageUrl,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError>;

    /// Human-readable name of this fetcher
    fn name(&self) -> &str;
}
