//! Bounded-parallelism batch fetch coordinator

use super::{FetchError, FetchedPage, PageFetcher};
use crate::types::{PageId, PageUrl};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Runs [`PageFetcher::fetch_one`] for many pages under a concurrency gate
///
/// The gate is created per [`fetch_many`](Self::fetch_many) call, so concurrent
/// batches do not share a budget.
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: Arc<dyn PageFetcher>,
    max_concurrent: usize,
}

impl BatchFetcher {
    /// Create a coordinator; a limit of zero is treated as one
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Concurrency limit applied to each batch
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetch every item, at most `max_concurrent` at a time
    ///
    /// All items are attempted; one failure does not cancel its siblings. Firing
    /// `cancel` stops items still waiting for a permit and unwinds in-flight ones.
    /// Outcomes are returned in input order.
    pub async fn fetch_many(
        &self,
        items: Vec<(PageId, PageUrl)>,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        tracing::debug!(
            items = items.len(),
            max_concurrent = self.max_concurrent,
            fetcher = self.fetcher.name(),
            "Starting batch fetch"
        );

        let fetches = items.into_iter().map(|(id, url)| {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let cancel = cancel.clone();
            async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (id, Err(FetchError::Cancelled)),
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        // The semaphore is never closed while the batch runs
                        Err(_) => return (id, Err(FetchError::Cancelled)),
                    },
                };

                let result = fetcher.fetch_one(id, &url, &cancel).await;
                if let Err(e) = &result {
                    tracing::warn!(page_id = %id, url = %url, error = %e, "Page fetch failed");
                }
                (id, result)
            }
        });

        let results = futures::future::join_all(fetches).await;
        BatchOutcome { results }
    }
}

/// Per-item outcomes of a batch, in input order
#[derive(Debug)]
pub struct BatchOutcome {
    results: Vec<(PageId, Result<FetchedPage, FetchError>)>,
}

impl BatchOutcome {
    /// Whether every item succeeded (vacuously true for an empty batch)
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }

    /// Whether any item unwound because of cancellation
    pub fn was_cancelled(&self) -> bool {
        self.results
            .iter()
            .any(|(_, result)| matches!(result, Err(FetchError::Cancelled)))
    }

    /// Outcome for a specific page
    pub fn get(&self, id: PageId) -> Option<&Result<FetchedPage, FetchError>> {
        self.results
            .iter()
            .find(|(item, _)| *item == id)
            .map(|(_, result)| result)
    }

    /// All per-item outcomes in input order
    pub fn results(&self) -> &[(PageId, Result<FetchedPage, FetchError>)] {
        &self.results
    }

    /// Error messages of failed items, in input order
    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(_, result)| result.as_ref().err().map(ToString::to_string))
            .collect()
    }

    /// Collapse to one result; the error joins every item error with "; "
    pub fn into_result(self) -> Result<Vec<FetchedPage>, String> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }
        Ok(self
            .results
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .collect())
    }
}
