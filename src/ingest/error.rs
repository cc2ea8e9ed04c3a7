// src/ingest/error.rs
use std::time::Duration;

/// Why a single feed produced nothing. Logged by the fetcher, never returned past it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("feed could not be parsed: {0}")]
    Parse(String),
}
