// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod export;
pub mod pipeline;

// Feed fetch + round-robin merge
pub mod ingest;

// Trending (curated topics, auto-entities) and classification collaborators
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{trending_curated, trending_entities, TrendingResult};
pub use crate::config::PipelineConfig;
pub use crate::ingest::merge::{merge_round_robin, DedupeKey, MergeOutcome};
pub use crate::ingest::types::{Entry, FeedProvider, FeedSource};
pub use crate::pipeline::{Pipeline, Report};
