use super::*;
use crate::downloader::test_helpers::{Script, ScriptedFetcher};
use crate::types::{DownloadStatus, PageId};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

mod pages;

/// Router, the downloader behind it, its scripted fetcher, and the tempdir to keep alive
struct TestApp {
    router: Router,
    downloader: Arc<WebPageDownloader>,
    fetcher: Arc<ScriptedFetcher>,
    _temp_dir: tempfile::TempDir,
}

async fn create_test_app() -> TestApp {
    let (downloader, fetcher, temp_dir) =
        crate::downloader::test_helpers::create_test_downloader().await;
    let downloader = Arc::new(downloader);
    let router = create_router(downloader.clone(), downloader.config.clone());

    TestApp {
        router,
        downloader,
        fetcher,
        _temp_dir: temp_dir,
    }
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and decode the body as JSON (`Value::Null` when empty)
async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Create a page through the API and return its ID
async fn create_page(router: &Router, url: &str) -> PageId {
    let (status, body) = send(
        router,
        json_request(Method::POST, "/pages", serde_json::json!({ "url": url })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let app = create_test_app().await;

    let mut config = (*app.downloader.config).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = app.downloader.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let app = create_test_app().await;

    let mut config = (*app.downloader.config).clone();
    config.server.api.cors_enabled = false;
    let router = create_router(app.downloader.clone(), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let app = create_test_app().await;

    let mut config = (*app.downloader.config).clone();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let router = create_router(app.downloader.clone(), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://allowed.example"
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
