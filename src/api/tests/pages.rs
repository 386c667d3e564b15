use super::*;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_page() {
    let app = create_test_app().await;

    let id = create_page(&app.router, "https://example.com/a").await;

    let (status, body) = send(&app.router, empty_request(Method::GET, &format!("/pages/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["url"], "https://example.com/a");
    assert_eq!(body["status"], "queued");
}

#[tokio::test]
async fn test_create_page_rejects_invalid_url() {
    let app = create_test_app().await;

    for url in ["", "example.com", "ftp://example.com/file"] {
        let (status, body) = send(
            &app.router,
            json_request(Method::POST, "/pages", json!({ "url": url })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "url {:?} was accepted", url);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    assert!(app.downloader.list_pages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_pages_in_creation_order() {
    let app = create_test_app().await;

    let first = create_page(&app.router, "https://example.com/1").await;
    let second = create_page(&app.router, "https://example.com/2").await;

    let (status, body) = send(&app.router, empty_request(Method::GET, "/pages")).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.to_string(), second.to_string()]);
}

#[tokio::test]
async fn test_get_unknown_page_is_404() {
    let app = create_test_app().await;

    let (status, body) = send(
        &app.router,
        empty_request(Method::GET, &format!("/pages/{}", PageId::new())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "page_not_found");
}

#[tokio::test]
async fn test_malformed_page_id_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/pages/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_page_url_requeues() {
    let app = create_test_app().await;
    let id = create_page(&app.router, "https://example.com/old").await;
    app.downloader.start_download(id).await.unwrap();

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/pages/{}", id),
            json!({ "url": "https://example.com/new" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.com/new");
    assert_eq!(body["status"], "queued");
}

#[tokio::test]
async fn test_update_page_status() {
    let app = create_test_app().await;
    let id = create_page(&app.router, "https://example.com/").await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/pages/{}", id),
            json!({ "status": "error" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");

    let page = app.downloader.get_page(id).await.unwrap();
    assert_eq!(page.status, DownloadStatus::Error);
}

#[tokio::test]
async fn test_update_page_url_and_status_applies_status_last() {
    let app = create_test_app().await;
    let id = create_page(&app.router, "https://example.com/old").await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/pages/{}", id),
            json!({ "url": "https://example.com/new", "status": "completed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.com/new");
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_update_page_rejects_bad_input() {
    let app = create_test_app().await;
    let id = create_page(&app.router, "https://example.com/").await;
    let uri = format!("/pages/{}", id);

    let (status, _) = send(&app.router, json_request(Method::PUT, &uri, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, &uri, json!({ "status": "not_set" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, &uri, json!({ "url": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let page = app.downloader.get_page(id).await.unwrap();
    assert_eq!(page.url.as_str(), "https://example.com/");
    assert_eq!(page.status, DownloadStatus::Queued);
}

#[tokio::test]
async fn test_delete_page() {
    let app = create_test_app().await;
    let id = create_page(&app.router, "https://example.com/").await;
    let uri = format!("/pages/{}", id);

    let (status, body) = send(&app.router, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app.router, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
