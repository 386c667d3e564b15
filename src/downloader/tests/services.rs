use super::*;

async fn wait_for_recorded(
    downloader: &crate::WebPageDownloader,
    id: PageId,
) -> Vec<crate::db::DownloadedPage> {
    for _ in 0..50 {
        let recorded = downloader.db.list_downloaded_pages(id).await.unwrap();
        if !recorded.is_empty() {
            return recorded;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Vec::new()
}

#[tokio::test]
async fn test_recorder_persists_downloaded_content() {
    let (downloader, fetcher, _temp_dir) = create_test_downloader().await;
    fetcher.script(
        "https://example.com/",
        Script::Succeed("<html>ok</html>".to_string()),
    );
    let id = downloader.add_page("https://example.com/").await.unwrap();

    downloader.start_download(id).await.unwrap();

    let recorded = wait_for_recorded(&downloader, id).await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].content, "<html>ok</html>");
    assert_eq!(recorded[0].web_page_id, id.to_string());
}

#[tokio::test]
async fn test_recorder_ignores_failed_downloads() {
    let (downloader, fetcher, _temp_dir) = create_test_downloader().await;
    fetcher.script("https://example.com/", Script::Fail(500));
    let id = downloader.add_page("https://example.com/").await.unwrap();

    assert!(downloader.start_download(id).await.is_err());

    assert!(wait_for_recorded(&downloader, id).await.is_empty());
}
