// src/ingest/types.rs
use anyhow::Result;

/// Placeholder used when a feed entry carries no usable title.
pub const NO_TITLE: &str = "No Title";

/// Normalized headline record, immutable once built by the fetcher.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub title: String,     // never empty
    pub link: String,      // may be empty
    pub summary: String,   // may be empty
    pub published: String, // as delivered, unparsed
    pub source: String,    // feed title, or the feed URL
}

/// A fetched feed endpoint: its URL plus the display name used as `Entry::source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub name: String,
}

impl FeedSource {
    /// Display name falls back to the URL when the feed declares no title.
    pub fn new(url: &str, declared_title: Option<&str>) -> Self {
        let name = declared_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url)
            .to_string();
        Self {
            url: url.to_string(),
            name,
        }
    }
}

/// Source-specific entry fields before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

/// Parsed feed document. `malformed` carries the parser error when the
/// document broke off part way; `entries` then holds what was read before it.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
    pub malformed: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_raw(&self) -> Result<RawFeed>;
    fn url(&self) -> &str;
}
