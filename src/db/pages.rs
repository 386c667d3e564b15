//! Tracked page CRUD operations.

use crate::error::DatabaseError;
use crate::types::{DownloadStatus, Page, PageId};
use crate::{Error, Result};

use super::{Database, PageRow};

impl Database {
    /// Insert a new page record
    pub async fn insert_page(&self, page: &Page) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO web_pages (id, url, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(page.id.to_string())
        .bind(page.url.as_str())
        .bind(page.status.to_i32())
        .bind(page.created_at.timestamp_millis())
        .bind(page.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert page: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Get a page by ID
    pub async fn get_page(&self, id: PageId) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, url, status, created_at, updated_at
            FROM web_pages
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get page: {}",
                e
            )))
        })?;

        row.map(Page::try_from).transpose()
    }

    /// List all pages, oldest first
    pub async fn list_pages(&self) -> Result<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, url, status, created_at, updated_at
            FROM web_pages
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list pages: {}",
                e
            )))
        })?;

        rows.into_iter().map(Page::try_from).collect()
    }

    /// Persist every mutable field of `page`
    ///
    /// Returns `false` if no page with that ID exists.
    pub async fn update_page(&self, page: &Page) -> Result<bool> {
        let result =
            sqlx::query("UPDATE web_pages SET url = ?, status = ?, updated_at = ? WHERE id = ?")
                .bind(page.url.as_str())
                .bind(page.status.to_i32())
                .bind(page.updated_at.timestamp_millis())
                .bind(page.id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to update page: {}",
                        e
                    )))
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Update page status
    pub async fn update_page_status(&self, id: PageId, status: DownloadStatus) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query("UPDATE web_pages SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_i32())
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update page status: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Move `id` to `to` only while it is still in `from`
    ///
    /// Returns `false` if the page is missing or has already left `from`.
    pub async fn transition_page_status(
        &self,
        id: PageId,
        from: DownloadStatus,
        to: DownloadStatus,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "UPDATE web_pages SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(to.to_i32())
        .bind(now)
        .bind(id.to_string())
        .bind(from.to_i32())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to transition page status: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a page `Cancelled`
    ///
    /// Returns `true` only if this call changed the status.
    pub async fn mark_page_cancelled(&self, id: PageId) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        let cancelled = DownloadStatus::Cancelled.to_i32();

        let result = sqlx::query(
            "UPDATE web_pages SET status = ?, updated_at = ? WHERE id = ? AND status != ?",
        )
        .bind(cancelled)
        .bind(now)
        .bind(id.to_string())
        .bind(cancelled)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to cancel page: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a page and, through the foreign key, its recorded content
    ///
    /// Returns `false` if no page with that ID exists.
    pub async fn delete_page(&self, id: PageId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM web_pages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete page: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
