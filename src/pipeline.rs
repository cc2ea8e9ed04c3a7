//! One full run: fetch → merge → classify → trending.
//!
//! Each run is independent. Feeds are fetched concurrently; everything after
//! the merge is a single sequential pass so ordering stays deterministic.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::gauge;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyze::{
    align_results, top_labels, trending_entities, Classification, CuratedMatcher,
    EntityCapability, HeadlineClassifier, KeywordClassifier, KeywordTagger, MultiLabelTagger,
    Taxonomy, TrendingResult,
};
use crate::config::PipelineConfig;
use crate::ingest::merge::source_mix;
use crate::ingest::providers::{build_http_client, RssFeedProvider};
use crate::ingest::types::{Entry, FeedProvider};
use crate::ingest::{fetch_headlines_round_robin, FetchOptions};

pub const EMPTY_NOTICE: &str =
    "No articles returned. Try increasing article count, per-feed cap, or disabling dedupe.";

/// How many labels the report keeps in its top-label tables.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
    pub duplicates: usize,
    pub source_mix: Vec<(String, usize)>,
    /// Aligned with `entries`.
    pub classifications: Vec<Classification>,
    /// Aligned with `entries`.
    pub tags: Vec<Vec<String>>,
    pub top_labels: Vec<(String, usize)>,
    pub top_tags: Vec<(String, usize)>,
    pub min_sources: usize,
    pub curated: Vec<TrendingResult>,
    /// `None` when auto-entities are off or unavailable.
    pub entities: Option<Vec<TrendingResult>>,
    /// User-visible notices (empty state, shape mismatches, disabled features).
    pub notices: Vec<String>,
}

impl Report {
    fn empty(min_sources: usize, duplicates: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            entries: Vec::new(),
            duplicates,
            source_mix: Vec::new(),
            classifications: Vec::new(),
            tags: Vec::new(),
            top_labels: Vec::new(),
            top_tags: Vec::new(),
            min_sources,
            curated: Vec::new(),
            entities: None,
            notices: vec![EMPTY_NOTICE.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Pipeline {
    cfg: PipelineConfig,
    providers: Vec<Box<dyn FeedProvider>>,
    curated: CuratedMatcher,
    entities: EntityCapability,
    classifier: Box<dyn HeadlineClassifier>,
    tagger: Box<dyn MultiLabelTagger>,
}

impl Pipeline {
    /// Build HTTP providers, the taxonomy, and the entity capability from `cfg`.
    /// Tables are loaded here once and stay fixed for the pipeline's lifetime.
    pub fn from_config(cfg: PipelineConfig) -> Result<Self> {
        cfg.validate()?;
        let client = build_http_client(&cfg.user_agent, cfg.fetch_timeout())
            .context("building http client")?;
        let providers: Vec<Box<dyn FeedProvider>> = cfg
            .feeds
            .iter()
            .map(|url| {
                Box::new(RssFeedProvider::from_url(url, client.clone())) as Box<dyn FeedProvider>
            })
            .collect();

        let taxonomy = match &cfg.topics_path {
            Some(path) => Taxonomy::load_from(path)?,
            None => Taxonomy::default_seed(),
        };
        let curated = CuratedMatcher::new(&taxonomy)?;
        let entities = EntityCapability::detect(cfg.auto_entities, &cfg.entities_path);

        Ok(Self::new(cfg, providers, curated, entities))
    }

    /// Assemble from parts, with the keyword classifier and tagger.
    pub fn new(
        cfg: PipelineConfig,
        providers: Vec<Box<dyn FeedProvider>>,
        curated: CuratedMatcher,
        entities: EntityCapability,
    ) -> Self {
        Self {
            cfg,
            providers,
            curated,
            entities,
            classifier: Box::new(KeywordClassifier),
            tagger: Box::new(KeywordTagger),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn HeadlineClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_tagger(mut self, tagger: Box<dyn MultiLabelTagger>) -> Self {
        self.tagger = tagger;
        self
    }

    pub async fn run(&self) -> Report {
        let opts = FetchOptions {
            total_limit: self.cfg.total_limit,
            per_feed_cap: self.cfg.feed_cap(),
            dedupe: self.cfg.dedupe,
            timeout: self.cfg.fetch_timeout(),
        };
        let merged = fetch_headlines_round_robin(&self.providers, opts).await;
        gauge!("pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
        info!(
            target: "pipeline",
            kept = merged.entries.len(),
            duplicates = merged.duplicates,
            "fetched and merged"
        );

        if merged.entries.is_empty() {
            warn!(target: "pipeline", "{EMPTY_NOTICE}");
            return Report::empty(self.cfg.min_sources, merged.duplicates);
        }
        self.analyze(merged.entries, merged.duplicates)
    }

    /// Everything downstream of the merge. `entries` must be non-empty.
    fn analyze(&self, entries: Vec<Entry>, duplicates: usize) -> Report {
        let mut notices = Vec::new();
        let n = entries.len();
        let titles: Vec<String> = entries.iter().map(|e| e.title.clone()).collect();

        let (classifications, notice) = align_results(self.classifier.classify(&titles), n, "NLP");
        notices.extend(notice);
        let (tags, notice) = align_results(self.tagger.tag(&titles), n, "ML");
        notices.extend(notice);

        let label_counts = top_labels(classifications.iter().map(|c| c.label.as_str()), TOP_N);
        let top_tags = top_labels(tags.iter().flatten().map(String::as_str), TOP_N);

        let min_sources = self.cfg.min_sources;
        let curated = self.curated.trending(&entries, min_sources);
        let entities = match self.entities.recognizer() {
            Some(r) => Some(trending_entities(&entries, r, min_sources)),
            None => {
                if self.cfg.auto_entities {
                    notices.push(
                        "Auto-entities unavailable: no entity recognizer loaded.".to_string(),
                    );
                }
                None
            }
        };

        info!(
            target: "pipeline",
            curated = curated.len(),
            entities = ?entities.as_ref().map(Vec::len),
            "trending computed"
        );

        Report {
            generated_at: Utc::now(),
            source_mix: source_mix(&entries),
            entries,
            duplicates,
            classifications,
            tags,
            top_labels: label_counts,
            top_tags,
            min_sources,
            curated,
            entities,
            notices,
        }
    }
}
