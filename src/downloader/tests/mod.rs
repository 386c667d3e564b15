use super::test_helpers::{Script, ScriptedFetcher, create_test_downloader};
use crate::error::{DownloadError, Error};
use crate::types::{DownloadOutcome, DownloadStatus, Event, PageId};
use std::time::Duration;
use tokio::sync::broadcast;

mod services;

/// Drain every event currently buffered in `rx`
fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until the scripted fetcher has started a fetch
async fn fetch_started(fetcher: &ScriptedFetcher) {
    tokio::time::timeout(Duration::from_secs(5), fetcher.started.notified())
        .await
        .expect("fetch never started");
}
