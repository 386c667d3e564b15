//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the webpage-dl REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the webpage-dl REST API
///
/// Served as JSON from `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "webpage-dl REST API",
        version = "0.1.0",
        description = "REST API for tracking web pages and orchestrating their downloads",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        // Pages
        crate::api::routes::list_pages,
        crate::api::routes::get_page,
        crate::api::routes::create_page,
        crate::api::routes::update_page,
        crate::api::routes::delete_page,

        // Downloads
        crate::api::routes::download_page,
        crate::api::routes::download_pages,
        crate::api::routes::retry_download,
        crate::api::routes::cancel_download,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::PageId,
        crate::types::Page,
        crate::types::DownloadStatus,
        crate::types::DownloadOutcome,
        crate::types::Event,

        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::RetryConfig,
        crate::config::PersistenceConfig,
        crate::config::ServerConfig,
        crate::config::ApiConfig,

        crate::api::routes::CreatePageRequest,
        crate::api::routes::CreatePageResponse,
        crate::api::routes::UpdatePageRequest,
        crate::api::routes::BatchDownloadRequest,
        crate::api::routes::BatchDownloadResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "pages", description = "Tracked page management"),
        (name = "downloads", description = "Download orchestration"),
        (name = "system", description = "Health, events and API documentation")
    )
)]
pub struct ApiDoc;
