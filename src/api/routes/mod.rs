//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`pages`] - Tracked page management
//! - [`downloads`] - Starting, retrying and cancelling downloads
//! - [`system`] - Health, events, OpenAPI

use crate::types::{DownloadStatus, PageId};
use serde::{Deserialize, Serialize};

mod downloads;
mod pages;
mod system;

pub use downloads::*;
pub use pages::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /pages
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreatePageRequest {
    /// Absolute http(s) URL to track
    pub url: String,
}

/// Response body for POST /pages
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreatePageResponse {
    /// ID assigned to the new page
    pub id: PageId,
}

/// Request body for PUT /pages/:id
///
/// At least one field must be present. When both are given the URL is applied
/// first, so the explicit status wins over the `Queued` reset.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdatePageRequest {
    /// New target URL (resets the page to `Queued`)
    #[serde(default)]
    pub url: Option<String>,
    /// Status override (`not_set` is rejected)
    #[serde(default)]
    pub status: Option<DownloadStatus>,
}

/// Request body for POST /pages/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BatchDownloadRequest {
    /// Pages to download, in order
    pub ids: Vec<PageId>,
}

/// Response body for POST /pages/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BatchDownloadResponse {
    /// Pages whose download finished without error (completed or cancelled)
    pub succeeded: Vec<PageId>,
}
