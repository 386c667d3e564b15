//! Database layer for webpage-dl
//!
//! Handles SQLite persistence for tracked pages and the content recorded for them.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`pages`] - Tracked page CRUD and status updates
//! - [`downloaded`] - Recorded page content

use crate::error::DatabaseError;
use crate::types::{DownloadStatus, Page, PageId, PageUrl};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

mod downloaded;
mod migrations;
mod pages;

/// Page record from database
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    /// Page ID (hyphenated UUID)
    pub id: String,
    /// Target URL
    pub url: String,
    /// Status code (see [`DownloadStatus::to_i32`])
    pub status: i32,
    /// Unix timestamp in milliseconds when the page was created
    pub created_at: i64,
    /// Unix timestamp in milliseconds when the page was last modified
    pub updated_at: i64,
}

impl TryFrom<PageRow> for Page {
    type Error = Error;

    fn try_from(row: PageRow) -> Result<Self> {
        let corrupt = |what: &str| {
            Error::Database(DatabaseError::CorruptRow(format!(
                "page {}: invalid {}",
                row.id, what
            )))
        };

        let id: PageId = row.id.parse().map_err(|_| corrupt("id"))?;
        let url = PageUrl::parse(&row.url).map_err(|_| corrupt("url"))?;
        let status = DownloadStatus::from_i32(row.status).ok_or_else(|| corrupt("status"))?;
        let created_at =
            DateTime::<Utc>::from_timestamp_millis(row.created_at).ok_or_else(|| corrupt("created_at"))?;
        let updated_at =
            DateTime::<Utc>::from_timestamp_millis(row.updated_at).ok_or_else(|| corrupt("updated_at"))?;

        Ok(Page {
            id,
            url,
            status,
            created_at,
            updated_at,
        })
    }
}

/// Recorded page content
#[derive(Debug, Clone, FromRow)]
pub struct DownloadedPage {
    /// Unique record ID
    pub id: String,
    /// Page this content was fetched for
    pub web_page_id: String,
    /// Raw page body
    pub content: String,
    /// Unix timestamp in milliseconds when the content was recorded
    pub downloaded_at: i64,
}

/// Database handle for webpage-dl
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
