// src/ingest/providers/mod.rs
pub mod rss;

pub use rss::{build_http_client, parse_feed, RssFeedProvider};
