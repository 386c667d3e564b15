//! Storage for fetched page bodies
//!
//! Content is keyed by [`PageId`], never by URL, so keys are filename-safe and two
//! spellings of the same URL cannot collide.

use crate::types::PageId;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Keyed store shared by the fetcher (writes) and the downloader (reads)
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Durably store `content` under `id`, replacing any previous body
    async fn write(&self, id: PageId, content: &str) -> io::Result<()>;

    /// Read the body stored under `id`
    async fn read(&self, id: PageId) -> io::Result<String>;

    /// Remove the body stored under `id`; returns whether anything was removed
    async fn remove(&self, id: PageId) -> io::Result<bool>;

    /// Human-readable name of this store
    fn name(&self) -> &str;
}

/// Stores each body as `<root>/<page-id>.html`
#[derive(Clone, Debug)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the body for `id` is stored
    pub fn path_for(&self, id: PageId) -> PathBuf {
        self.root.join(format!("{}.html", id))
    }

    fn partial_path_for(&self, id: PageId) -> PathBuf {
        self.root.join(format!("{}.html.part", id))
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn write(&self, id: PageId, content: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Write-then-rename so readers never observe a half-written body
        let partial = self.partial_path_for(id);
        let mut file = tokio::fs::File::create(&partial).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&partial, self.path_for(id)).await?;

        tracing::debug!(page_id = %id, bytes = content.len(), "Stored page content");
        Ok(())
    }

    async fn read(&self, id: PageId) -> io::Result<String> {
        tokio::fs::read_to_string(self.path_for(id)).await
    }

    async fn remove(&self, id: PageId) -> io::Result<bool> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}
