//! Trending analysis over merged entries: curated taxonomy topics, auto-detected
//! entities, and the classification collaborators.

pub mod classify;
pub mod ner;
pub mod topics;

use serde::Serialize;
use std::collections::{HashMap, HashSet};

// Re-export convenient types.
pub use crate::analyze::classify::{
    align_results, top_labels, Classification, HeadlineClassifier, KeywordClassifier,
    KeywordTagger, MultiLabelTagger,
};
pub use crate::analyze::ner::{
    canonicalize, trending_entities, EntityCapability, EntityRecognizer, GazetteerRecognizer,
};
pub use crate::analyze::topics::{trending_curated, CuratedMatcher, Taxonomy};

/// Examples kept per topic.
pub const MAX_EXAMPLES: usize = 3;

/// A topic that crossed the source-diversity threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingResult {
    pub topic: String,
    pub source_count: usize,
    /// First `MAX_EXAMPLES` matches as `"[source] title"`.
    pub sample_headlines: Vec<String>,
}

#[derive(Debug, Default)]
struct TopicStats {
    sources: HashSet<String>,
    examples: Vec<String>,
}

/// Per-topic distinct sources plus first examples, remembering discovery order.
#[derive(Debug, Default)]
pub(crate) struct TopicTally {
    order: Vec<String>,
    topics: HashMap<String, TopicStats>,
}

impl TopicTally {
    pub(crate) fn record(&mut self, topic: &str, source: &str, title: &str) {
        let order = &mut self.order;
        let stats = self.topics.entry(topic.to_string()).or_insert_with(|| {
            order.push(topic.to_string());
            TopicStats::default()
        });
        stats.sources.insert(source.to_string());
        if stats.examples.len() < MAX_EXAMPLES {
            stats.examples.push(format!("[{source}] {title}"));
        }
    }

    /// Topics with at least `min_sources` distinct sources, most sources first.
    /// Ties keep discovery order.
    pub(crate) fn into_ranked(self, min_sources: usize) -> Vec<TrendingResult> {
        let mut topics = self.topics;
        let mut out: Vec<TrendingResult> = self
            .order
            .into_iter()
            .filter_map(|topic| {
                let stats = topics.remove(&topic)?;
                (stats.sources.len() >= min_sources).then(|| TrendingResult {
                    topic,
                    source_count: stats.sources.len(),
                    sample_headlines: stats.examples,
                })
            })
            .collect();
        // sort_by is stable
        out.sort_by(|a, b| b.source_count.cmp(&a.source_count));
        out
    }
}
