//! Error types for webpage-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Download, Database, Config, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::PageId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for webpage-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for webpage-dl
///
/// Every failure is scoped to a single page; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.timeout")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Input rejected before any download was attempted (e.g. malformed URL)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Stored row could not be turned back into a domain value
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Page not found in the database
    #[error("page {id} not found")]
    NotFound {
        /// The page ID that was not found
        id: PageId,
    },

    /// The fetch failed after retries; `message` joins every item error in input order
    #[error("download of page {id} failed: {message}")]
    Failed {
        /// The page whose download failed
        id: PageId,
        /// Joined error text from the batch coordinator
        message: String,
    },

    /// Another download of the same page is still in flight
    #[error("page {id} is already downloading")]
    AlreadyDownloading {
        /// The page that is already downloading
        id: PageId,
    },
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "page_not_found",
///     "message": "download error: page 6f1c... not found",
///     "details": { "page_id": "6f1c..." }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "page_not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            Error::Download(DownloadError::NotFound { .. }) => 404,
            Error::Download(DownloadError::AlreadyDownloading { .. }) => 409,

            // The upstream page could not be fetched
            Error::Download(DownloadError::Failed { .. }) => 502,
            Error::Network(_) => 502,

            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Serialization(_) => 500,
            Error::Other(_) => 500,

            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::Download(DownloadError::NotFound { .. }) => "page_not_found",
            Error::Download(DownloadError::Failed { .. }) => "download_failed",
            Error::Download(DownloadError::AlreadyDownloading { .. }) => "already_downloading",
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Download(
                DownloadError::NotFound { id } | DownloadError::AlreadyDownloading { id },
            ) => Some(serde_json::json!({
                "page_id": id,
            })),
            Error::Download(DownloadError::Failed { id, message }) => Some(serde_json::json!({
                "page_id": id,
                "reason": message,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        let id = PageId::new();
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("download.timeout".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("Url must be valid".into()),
                400,
                "validation_error",
            ),
            (
                Error::Download(DownloadError::AlreadyDownloading { id }),
                409,
                "already_downloading",
            ),
            (
                Error::Download(DownloadError::NotFound { id }),
                404,
                "page_not_found",
            ),
            (
                Error::Download(DownloadError::Failed {
                    id,
                    message: "HTTP 500".into(),
                }),
                502,
                "download_failed",
            ),
            (
                Error::Database(DatabaseError::QueryFailed("timeout".into())),
                500,
                "database_error",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (Error::ShuttingDown, 503, "shutting_down"),
            (Error::Other("boom".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn test_status_and_error_codes() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
            assert_eq!(error.error_code(), code, "code for {:?}", error);
        }
    }

    #[test]
    fn test_not_found_api_error_carries_page_id() {
        let id = PageId::new();
        let api_error: ApiError = Error::Download(DownloadError::NotFound { id }).into();

        assert_eq!(api_error.error.code, "page_not_found");
        let details = api_error.error.details.unwrap();
        assert_eq!(details["page_id"], id.to_string());
    }

    #[test]
    fn test_failed_api_error_carries_reason() {
        let id = PageId::new();
        let api_error: ApiError = Error::Download(DownloadError::Failed {
            id,
            message: "a; b".into(),
        })
        .into();

        assert!(api_error.error.message.contains("a; b"));
        assert_eq!(api_error.error.details.unwrap()["reason"], "a; b");
    }

    #[test]
    fn test_api_error_without_details_omits_field() {
        let api_error: ApiError = Error::ShuttingDown.into();
        let json = serde_json::to_value(&api_error).unwrap();

        assert!(json["error"].get("details").is_none());
    }
}
