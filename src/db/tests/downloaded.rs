use crate::db::*;
use crate::types::{Page, PageUrl};
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_insert_and_list_downloaded_pages() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let page = Page::new(PageUrl::parse("https://example.com").unwrap());
    db.insert_page(&page).await.unwrap();

    db.insert_downloaded_page(page.id, "<html>v1</html>")
        .await
        .unwrap();
    db.insert_downloaded_page(page.id, "<html>v2</html>")
        .await
        .unwrap();

    let recorded = db.list_downloaded_pages(page.id).await.unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].content, "<html>v1</html>");
    assert_eq!(recorded[1].content, "<html>v2</html>");
    assert!(recorded.iter().all(|r| r.web_page_id == page.id.to_string()));

    db.close().await;
}

#[tokio::test]
async fn test_downloaded_pages_require_existing_page() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let result = db
        .insert_downloaded_page(crate::types::PageId::new(), "orphan")
        .await;
    assert!(result.is_err(), "foreign key should reject unknown page");

    db.close().await;
}

#[tokio::test]
async fn test_deleting_page_removes_recorded_content() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let page = Page::new(PageUrl::parse("https://example.com").unwrap());
    db.insert_page(&page).await.unwrap();
    db.insert_downloaded_page(page.id, "body").await.unwrap();

    db.delete_page(page.id).await.unwrap();

    assert!(db.list_downloaded_pages(page.id).await.unwrap().is_empty());

    db.close().await;
}
