//! Custom assertions for integration tests

use std::time::Duration;
use tokio::sync::broadcast;
use webpage_dl::{DownloadStatus, Event, PageId, WebPageDownloader};

/// Collect events until timeout or until `stop_predicate` matches
pub async fn collect_events_until<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

/// Assert the persisted status of a page
pub async fn assert_page_status(
    downloader: &WebPageDownloader,
    id: PageId,
    expected: DownloadStatus,
) {
    let page = downloader.get_page(id).await.unwrap();
    assert_eq!(
        page.status, expected,
        "page {} has status {}, expected {}",
        id, page.status, expected
    );
}

/// Poll the database until the recorder has stored `count` bodies for `id`
pub async fn wait_for_recorded(
    downloader: &WebPageDownloader,
    id: PageId,
    count: usize,
) -> Vec<String> {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let recorded = downloader.db.list_downloaded_pages(id).await.unwrap();
            if recorded.len() >= count {
                return recorded
                    .into_iter()
                    .map(|r| r.content)
                    .collect::<Vec<_>>();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    result.unwrap_or_else(|_| panic!("recorder never stored {} bodies for {}", count, id))
}
