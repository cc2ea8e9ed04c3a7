//! Curated topic taxonomy and phrase matcher.
//!
//! The taxonomy is data: a list of `{ name, keywords }` tables, loaded from TOML
//! or taken from the built-in seed. Each keyword compiles to a case-insensitive,
//! word-bounded regex in which any run of whitespace or hyphens separates words,
//! so "interest rate" also matches "interest-rate" and "interest  rate".
//!
//! TOML shape:
//! ```toml
//! [[topics]]
//! name = "Interest Rates"
//! keywords = ["interest rate", "rate hikes"]
//! ```

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::analyze::{TopicTally, TrendingResult};
use crate::ingest::types::Entry;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TopicDef {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    pub topics: Vec<TopicDef>,
}

impl Taxonomy {
    /// Built-in world-news taxonomy.
    pub fn default_seed() -> Self {
        let seed: &[(&str, &[&str])] = &[
            ("AI", &["ai", "artificial intelligence"]),
            ("Gaza", &["gaza"]),
            ("Israel", &["israel"]),
            ("Ukraine", &["ukraine"]),
            ("Russia", &["russia"]),
            ("Putin", &["putin"]),
            ("NATO", &["nato"]),
            ("China", &["china"]),
            ("Xi", &["xi"]),
            ("Iran", &["iran"]),
            ("Taiwan", &["taiwan"]),
            ("Oil", &["oil", "opec"]),
            (
                "Interest Rates",
                &["interest rate", "interest rates", "rate hike", "rate hikes"],
            ),
            (
                "Climate",
                &["climate", "heatwave", "wildfire", "drought", "hurricane"],
            ),
            ("Strike", &["strike", "strikes"]),
            ("Protest", &["protest", "protests"]),
        ];
        Self {
            topics: seed
                .iter()
                .map(|(name, kws)| TopicDef {
                    name: name.to_string(),
                    keywords: kws.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let t: Taxonomy = toml::from_str(s).context("parsing topic taxonomy")?;
        Ok(t)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading topic taxonomy from {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/// Compile one keyword/phrase into a word-bounded, case-insensitive pattern.
/// A boundary is only required at an end that is a word character, so
/// keywords like "u.s." still match before a space or at end of title.
pub fn keyword_pattern(keyword: &str) -> Result<Regex> {
    let parts: Vec<&str> = keyword
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|p| !p.is_empty())
        .collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return Err(anyhow!("empty keyword"));
    };
    let lead = if first.starts_with(is_word_char) { r"\b" } else { "" };
    let trail = if last.ends_with(is_word_char) { r"\b" } else { "" };
    let joined = parts
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join(r"[\s\-]+");
    Regex::new(&format!(r"(?i){lead}{joined}{trail}"))
        .map_err(|e| anyhow!("keyword `{keyword}` regex error: {e}"))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone)]
struct CompiledTopic {
    name: String,
    patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct CuratedMatcher {
    topics: Vec<CompiledTopic>,
}

static GLOBAL_MATCHER: Lazy<CuratedMatcher> = Lazy::new(|| {
    CuratedMatcher::new(&Taxonomy::default_seed()).expect("built-in taxonomy compiles")
});

impl CuratedMatcher {
    pub fn new(taxonomy: &Taxonomy) -> Result<Self> {
        let topics = taxonomy
            .topics
            .iter()
            .map(|t| {
                let patterns = t
                    .keywords
                    .iter()
                    .map(|k| keyword_pattern(k))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("topic `{}`", t.name))?;
                Ok(CompiledTopic {
                    name: t.name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { topics })
    }

    /// Matcher over the built-in seed, compiled once per process.
    pub fn global() -> &'static CuratedMatcher {
        &GLOBAL_MATCHER
    }

    /// Topics whose keywords match `title`, in taxonomy order.
    pub fn topics_for<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.topics
            .iter()
            .filter(move |t| t.patterns.iter().any(|p| p.is_match(title)))
            .map(|t| t.name.as_str())
    }

    /// Curated topics mentioned by at least `min_sources` distinct sources.
    pub fn trending(&self, entries: &[Entry], min_sources: usize) -> Vec<TrendingResult> {
        let mut tally = TopicTally::default();
        for e in entries {
            for topic in self.topics_for(&e.title) {
                tally.record(topic, &e.source, &e.title);
            }
        }
        let ranked = tally.into_ranked(min_sources);
        tracing::debug!(target: "trending", topics = ranked.len(), min_sources, "curated trending");
        ranked
    }
}

/// Curated trending over the built-in taxonomy.
pub fn trending_curated(entries: &[Entry], min_sources: usize) -> Vec<TrendingResult> {
    CuratedMatcher::global().trending(entries, min_sources)
}
