//! REST API server module
//!
//! Exposes tracked pages and download control over HTTP, plus a server-sent
//! events stream of lifecycle events.

use crate::{Config, Result, WebPageDownloader};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Pages
/// - `GET /pages` - List tracked pages
/// - `POST /pages` - Start tracking a page
/// - `GET /pages/:id` - Get single page
/// - `PUT /pages/:id` - Update URL and/or status
/// - `DELETE /pages/:id` - Stop tracking a page
///
/// ## Downloads
/// - `POST /pages/:id/download` - Download a page
/// - `POST /pages/download` - Download several pages in order
/// - `POST /pages/:id/retry` - Retry a download
/// - `POST /pages/:id/cancel` - Cancel a download
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /events` - Server-sent events stream
pub fn create_router(downloader: Arc<WebPageDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // Pages
        .route(
            "/pages",
            get(routes::list_pages).post(routes::create_page),
        )
        .route(
            "/pages/:id",
            get(routes::get_page)
                .put(routes::update_page)
                .delete(routes::delete_page),
        )
        // Downloads
        .route("/pages/download", post(routes::download_pages))
        .route("/pages/:id/download", post(routes::download_page))
        .route("/pages/:id/retry", post(routes::retry_download))
        .route("/pages/:id/cancel", post(routes::cancel_download))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are permitted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops.
///
/// # Example
///
/// ```no_run
/// use webpage_dl::{Config, WebPageDownloader};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(WebPageDownloader::new((*config).clone()).await?);
///
/// webpage_dl::api::start_api_server(downloader, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    downloader: Arc<WebPageDownloader>,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
