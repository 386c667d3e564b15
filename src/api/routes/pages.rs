//! Tracked page handlers.

use super::{CreatePageRequest, CreatePageResponse, UpdatePageRequest};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{Page, PageId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET /pages - List all tracked pages
#[utoipa::path(
    get,
    path = "/pages",
    tag = "pages",
    responses(
        (status = 200, description = "All tracked pages, oldest first", body = Vec<Page>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_pages(State(state): State<AppState>) -> Result<Json<Vec<Page>>> {
    Ok(Json(state.downloader.list_pages().await?))
}

/// GET /pages/:id - Get a single page
#[utoipa::path(
    get,
    path = "/pages/{id}",
    tag = "pages",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    responses(
        (status = 200, description = "Page information", body = Page),
        (status = 404, description = "Page not found", body = crate::error::ApiError)
    )
)]
pub async fn get_page(State(state): State<AppState>, Path(id): Path<PageId>) -> Result<Json<Page>> {
    Ok(Json(state.downloader.get_page(id).await?))
}

/// POST /pages - Start tracking a page
#[utoipa::path(
    post,
    path = "/pages",
    tag = "pages",
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created in Queued status", body = CreatePageResponse),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError)
    )
)]
pub async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<CreatePageResponse>)> {
    let id = state.downloader.add_page(&request.url).await?;
    Ok((StatusCode::CREATED, Json(CreatePageResponse { id })))
}

/// PUT /pages/:id - Update a page's URL and/or status
#[utoipa::path(
    put,
    path = "/pages/{id}",
    tag = "pages",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Updated page", body = Page),
        (status = 400, description = "Invalid URL, invalid status or empty update", body = crate::error::ApiError),
        (status = 404, description = "Page not found", body = crate::error::ApiError)
    )
)]
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<PageId>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<Json<Page>> {
    let downloader = &state.downloader;

    let page = match (request.url, request.status) {
        (None, None) => {
            return Err(Error::Validation(
                "update must set url or status".to_string(),
            ));
        }
        (Some(url), None) => downloader.update_page_url(id, &url).await?,
        (None, Some(status)) => downloader.update_page_status(id, status).await?,
        (Some(url), Some(status)) => {
            downloader.update_page_url(id, &url).await?;
            downloader.update_page_status(id, status).await?
        }
    };

    Ok(Json(page))
}

/// DELETE /pages/:id - Stop tracking a page
#[utoipa::path(
    delete,
    path = "/pages/{id}",
    tag = "pages",
    params(
        ("id" = PageId, Path, description = "Page ID")
    ),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 404, description = "Page not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<PageId>,
) -> Result<StatusCode> {
    state.downloader.delete_page(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
