//! HTTP error response handling for the API
//!
//! Converts domain errors into HTTP responses with the matching status code and
//! a JSON [`ApiError`] body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Errors with a known status go through Error::into_response
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DownloadError;
    use crate::types::PageId;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_error_into_response() {
        let error = Error::Validation("url must use http or https".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "validation_error");
        assert!(api_error.error.message.contains("http or https"));
    }

    #[tokio::test]
    async fn test_concurrent_start_is_conflict() {
        let id = PageId::new();
        let response = Error::Download(DownloadError::AlreadyDownloading { id }).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "already_downloading");
        assert_eq!(
            api_error.error.details.as_ref().unwrap()["page_id"],
            id.to_string()
        );
    }

    #[tokio::test]
    async fn test_page_not_found_into_response() {
        let id = PageId::new();
        let response = Error::Download(DownloadError::NotFound { id }).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "page_not_found");
        assert_eq!(
            api_error.error.details.as_ref().unwrap()["page_id"],
            id.to_string()
        );
    }

    #[tokio::test]
    async fn test_failed_download_is_bad_gateway() {
        let id = PageId::new();
        let response = Error::Download(DownloadError::Failed {
            id,
            message: "HTTP 500 from https://example.com/".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "download_failed");
        assert_eq!(
            api_error.error.details.as_ref().unwrap()["reason"],
            "HTTP 500 from https://example.com/"
        );
    }

    #[tokio::test]
    async fn test_shutting_down_is_service_unavailable() {
        let response = Error::ShuttingDown.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_bare_api_error_is_internal() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error.code, "internal_error");
    }
}
