//! Recorded page content.

use crate::error::DatabaseError;
use crate::types::PageId;
use crate::{Error, Result};
use uuid::Uuid;

use super::{Database, DownloadedPage};

impl Database {
    /// Record a fetched body for `page_id`; returns the record ID
    pub async fn insert_downloaded_page(&self, page_id: PageId, content: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO downloaded_pages (id, web_page_id, content, downloaded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(page_id.to_string())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert downloaded page: {}",
                e
            )))
        })?;

        Ok(id)
    }

    /// List recorded bodies for `page_id`, oldest first
    pub async fn list_downloaded_pages(&self, page_id: PageId) -> Result<Vec<DownloadedPage>> {
        let rows = sqlx::query_as::<_, DownloadedPage>(
            r#"
            SELECT id, web_page_id, content, downloaded_at
            FROM downloaded_pages
            WHERE web_page_id = ?
            ORDER BY downloaded_at ASC, rowid ASC
            "#,
        )
        .bind(page_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list downloaded pages: {}",
                e
            )))
        })?;

        Ok(rows)
    }
}
