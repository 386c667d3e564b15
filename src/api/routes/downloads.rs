//! Download control handlers.
//!
//! Each download runs on its own task so that reconciliation finishes even when
//! the client goes away. The request holds a drop guard on the caller token:
//! a disconnect cancels the download and the page ends up `Cancelled`.

use super::{BatchDownloadRequest, BatchDownloadResponse};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{DownloadOutcome, PageId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `work` on a detached task tied to the lifetime of the request
async fn run_request_scoped<T, F, Fut>(work: F) -> Result<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let caller = CancellationToken::new();
    let _disconnect = caller.clone().drop_guard();

    tokio::spawn(work(caller))
        .await
        .map_err(|e| Error::Other(format!("download task failed: {}", e)))?
}

/// POST /pages/:id/download - Download a page and wait for the outcome
#[utoipa::path(
    post,
    path = "/pages/{id}/download",
    tag = "downloads",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    responses(
        (status = 200, description = "Download completed or was cancelled", body = DownloadOutcome),
        (status = 404, description = "Page not found", body = crate::error::ApiError),
        (status = 409, description = "Page is already downloading", body = crate::error::ApiError),
        (status = 502, description = "Page could not be fetched", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn download_page(
    State(state): State<AppState>,
    Path(id): Path<PageId>,
) -> Result<Json<DownloadOutcome>> {
    let downloader = state.downloader.clone();
    let outcome = run_request_scoped(move |caller| async move {
        downloader.start_download_with_cancel(id, caller).await
    })
    .await?;

    Ok(Json(outcome))
}

/// POST /pages/download - Download several pages one after another
///
/// Every page is attempted; the response lists the ones that did not fail.
#[utoipa::path(
    post,
    path = "/pages/download",
    tag = "downloads",
    request_body = BatchDownloadRequest,
    responses(
        (status = 200, description = "IDs of pages that completed or were cancelled", body = BatchDownloadResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn download_pages(
    State(state): State<AppState>,
    Json(request): Json<BatchDownloadRequest>,
) -> Result<Json<BatchDownloadResponse>> {
    let downloader = state.downloader.clone();
    let outcomes = run_request_scoped(move |caller| async move {
        Ok::<_, Error>(
            downloader
                .start_downloads_with_cancel(&request.ids, caller)
                .await,
        )
    })
    .await?;

    let succeeded = outcomes
        .into_iter()
        .filter_map(|(id, result)| result.ok().map(|_| id))
        .collect();

    Ok(Json(BatchDownloadResponse { succeeded }))
}

/// POST /pages/:id/retry - Run a page's download again from any status
#[utoipa::path(
    post,
    path = "/pages/{id}/retry",
    tag = "downloads",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    responses(
        (status = 200, description = "Download completed or was cancelled", body = DownloadOutcome),
        (status = 404, description = "Page not found", body = crate::error::ApiError),
        (status = 409, description = "Page is already downloading", body = crate::error::ApiError),
        (status = 502, description = "Page could not be fetched", body = crate::error::ApiError)
    )
)]
pub async fn retry_download(
    State(state): State<AppState>,
    Path(id): Path<PageId>,
) -> Result<Json<DownloadOutcome>> {
    let downloader = state.downloader.clone();
    let outcome = run_request_scoped(move |caller| async move {
        downloader.retry_download_with_cancel(id, caller).await
    })
    .await?;

    Ok(Json(outcome))
}

/// POST /pages/:id/cancel - Cancel a page's download
#[utoipa::path(
    post,
    path = "/pages/{id}/cancel",
    tag = "downloads",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    responses(
        (status = 204, description = "Page marked cancelled"),
        (status = 404, description = "Page not found", body = crate::error::ApiError)
    )
)]
pub async fn cancel_download(
    State(state): State<AppState>,
    Path(id): Path<PageId>,
) -> Result<StatusCode> {
    state.downloader.cancel_download(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
