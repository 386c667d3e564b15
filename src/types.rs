//! Core types for webpage-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Unique identifier for a tracked page
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PageId(pub Uuid);

impl PageId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Absolute http(s) URL of a tracked page
///
/// Construction goes through [`PageUrl::parse`], so a `PageUrl` in hand is
/// always non-empty, absolute, and uses the `http` or `https` scheme.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageUrl(String);

impl PageUrl {
    /// Validate and wrap a URL string
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Url must not be empty".to_string()));
        }

        let parsed = url::Url::parse(trimmed)
            .map_err(|e| Error::Validation(format!("Url must be valid: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Validation(format!(
                    "Url scheme must be http or https, got '{}'",
                    other
                )));
            }
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(Error::Validation("Url must have a host".to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PageUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PageUrl> for String {
    fn from(url: PageUrl) -> Self {
        url.0
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Download status of a page
///
/// `Queued → InProgress → {Completed | Cancelled | Error}`; a retry re-enters
/// `InProgress` from any terminal state. The integer codes are the persisted form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Registered and waiting for a download to be requested
    Queued,
    /// A fetch is in flight
    InProgress,
    /// Content fetched and handed downstream
    Completed,
    /// Download cancelled by request
    Cancelled,
    /// Fetch failed after all retries
    Error,
    /// Uninitialized sentinel; never observed on a created page
    NotSet,
}

impl DownloadStatus {
    /// Convert integer status code to DownloadStatus
    pub fn from_i32(status: i32) -> Option<Self> {
        match status {
            1 => Some(DownloadStatus::Queued),
            2 => Some(DownloadStatus::InProgress),
            3 => Some(DownloadStatus::Completed),
            4 => Some(DownloadStatus::Cancelled),
            5 => Some(DownloadStatus::Error),
            6 => Some(DownloadStatus::NotSet),
            _ => None,
        }
    }

    /// Convert DownloadStatus to integer status code
    pub fn to_i32(&self) -> i32 {
        match self {
            DownloadStatus::Queued => 1,
            DownloadStatus::InProgress => 2,
            DownloadStatus::Completed => 3,
            DownloadStatus::Cancelled => 4,
            DownloadStatus::Error => 5,
            DownloadStatus::NotSet => 6,
        }
    }

    /// Stable string name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Queued => "queued",
            DownloadStatus::InProgress => "in_progress",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Cancelled => "cancelled",
            DownloadStatus::Error => "error",
            DownloadStatus::NotSet => "not_set",
        }
    }

    /// Whether this status ends an attempt
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Completed | DownloadStatus::Cancelled | DownloadStatus::Error
        )
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked web page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    /// Unique page ID
    pub id: PageId,
    /// Target URL
    #[schema(value_type = String, example = "https://example.com")]
    pub url: PageUrl,
    /// Current download status
    pub status: DownloadStatus,
    /// When the page was registered
    pub created_at: DateTime<Utc>,
    /// When the page was last modified
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Create a new page in the `Queued` state
    pub fn new(url: PageUrl) -> Self {
        let now = Utc::now();
        Self {
            id: PageId::new(),
            url,
            status: DownloadStatus::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the page to a new status
    pub fn set_status(&mut self, status: DownloadStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Point the page at a new URL; the next download starts from `Queued`
    pub fn set_url(&mut self, url: PageUrl) {
        self.url = url;
        self.set_status(DownloadStatus::Queued);
    }
}

/// Result of a download that did not fail
///
/// Cancellation is not an error from the caller's perspective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// Page fetched, status `Completed`, notification published
    Completed {
        /// Page ID
        id: PageId,
        /// Size of the stored body in bytes
        bytes: usize,
    },
    /// Download cancelled, status `Cancelled`
    Cancelled {
        /// Page ID
        id: PageId,
    },
}

impl DownloadOutcome {
    /// The page this outcome belongs to
    pub fn id(&self) -> PageId {
        match self {
            DownloadOutcome::Completed { id, .. } | DownloadOutcome::Cancelled { id } => *id,
        }
    }

    /// The status the page was left in
    pub fn status(&self) -> DownloadStatus {
        match self {
            DownloadOutcome::Completed { .. } => DownloadStatus::Completed,
            DownloadOutcome::Cancelled { .. } => DownloadStatus::Cancelled,
        }
    }
}

/// Event emitted during the page lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Page registered for tracking
    Queued {
        /// Page ID
        id: PageId,
        /// Target URL
        url: String,
    },

    /// Page moved to `InProgress`
    DownloadStarted {
        /// Page ID
        id: PageId,
    },

    /// Page fetched; carries the exact body written by the fetcher
    PageDownloaded {
        /// Page ID
        id: PageId,
        /// Raw page body
        content: String,
    },

    /// Page moved to `Error`
    DownloadFailed {
        /// Page ID
        id: PageId,
        /// Joined error text
        error: String,
    },

    /// Page moved to `Cancelled`
    DownloadCancelled {
        /// Page ID
        id: PageId,
    },

    /// Page deleted
    PageRemoved {
        /// Page ID
        id: PageId,
    },

    /// Downloader shutting down
    Shutdown,
}
