//! Auto-trending over named entities.
//!
//! Entity recognition is a collaborator behind `EntityRecognizer`. Whether one
//! is usable is decided once at startup (`EntityCapability::detect`); when it is
//! not, auto-trending is skipped for the whole run.
//!
//! The bundled recognizer is a gazetteer: a JSON file of `{ regex, label }`
//! patterns (default `config/entities.json`). Every match yields the matched
//! span as written in the title.
//!
//! Notes:
//! - Regexes must be compatible with the `regex` crate (no lookarounds).
//! - Case-insensitive can be specified using `(?i)` in patterns.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::analyze::{TopicTally, TrendingResult};
use crate::ingest::types::Entry;

/// Entity categories that count toward trending (spaCy-style labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Person,
    Organization,
    Geopolitical,
    Location,
    Group,
    Event,
    Product,
}

impl EntityCategory {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PERSON" => Some(Self::Person),
            "ORG" => Some(Self::Organization),
            "GPE" => Some(Self::Geopolitical),
            "LOC" => Some(Self::Location),
            "NORP" => Some(Self::Group),
            "EVENT" => Some(Self::Event),
            "PRODUCT" => Some(Self::Product),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORG",
            Self::Geopolitical => "GPE",
            Self::Location => "LOC",
            Self::Group => "NORP",
            Self::Event => "EVENT",
            Self::Product => "PRODUCT",
        }
    }
}

/// One span reported by a recognizer. `label` may be outside `EntityCategory`;
/// such spans are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    pub text: String,
    pub label: String,
}

pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<RecognizedEntity>;
    fn name(&self) -> &'static str;
}

/// Result of the one-time availability check.
#[derive(Clone)]
pub enum EntityCapability {
    Available(Arc<dyn EntityRecognizer>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for EntityCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(r) => f.debug_tuple("Available").field(&r.name()).finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl EntityCapability {
    /// Off unless `enabled`; otherwise available iff the gazetteer loads.
    pub fn detect(enabled: bool, gazetteer_path: &Path) -> Self {
        if !enabled {
            return Self::Unavailable {
                reason: "auto-entities disabled".to_string(),
            };
        }
        match GazetteerRecognizer::load_from(gazetteer_path) {
            Ok(g) => {
                tracing::info!(
                    target: "trending",
                    path = %gazetteer_path.display(),
                    patterns = g.len(),
                    "entity recognizer loaded"
                );
                Self::Available(Arc::new(g))
            }
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::info!(target: "trending", %reason, "auto-entities unavailable");
                Self::Unavailable { reason }
            }
        }
    }

    pub fn recognizer(&self) -> Option<&dyn EntityRecognizer> {
        match self {
            Self::Available(r) => Some(r.as_ref()),
            Self::Unavailable { .. } => None,
        }
    }
}

/* ----------------------------
Canonicalization
---------------------------- */

/// Short forms that are always upper-cased.
pub const ACRONYM_WHITELIST: [&str; 4] = ["AI", "EU", "UK", "US"];

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("united states", "US"),
        ("u.s.", "US"),
        ("usa", "US"),
        ("united kingdom", "UK"),
        ("u.k.", "UK"),
        ("britain", "UK"),
        ("european union", "EU"),
        ("artificial intelligence", "AI"),
    ])
});

/// Canonical form of an entity span:
/// 1. alias table (case-insensitive) → short form;
/// 2. spans of at most two chars whose upper case is whitelisted → upper case;
/// 3. otherwise the trimmed span as extracted.
pub fn canonicalize(span: &str) -> String {
    let t = span.trim();
    if let Some(short) = ALIASES.get(t.to_lowercase().as_str()) {
        return short.to_string();
    }
    let upper = t.to_uppercase();
    if t.chars().count() <= 2 && ACRONYM_WHITELIST.contains(&upper.as_str()) {
        return upper;
    }
    t.to_string()
}

/* ----------------------------
Gazetteer recognizer
---------------------------- */

#[derive(Debug, Deserialize)]
struct PatternCfg {
    regex: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    patterns: Vec<PatternCfg>,
}

#[derive(Debug)]
pub struct GazetteerRecognizer {
    patterns: Vec<(Regex, String)>,
}

impl GazetteerRecognizer {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: GazetteerFile = serde_json::from_str(s).context("parsing entity gazetteer")?;
        let patterns = file
            .patterns
            .into_iter()
            .map(|p| {
                let re = Regex::new(&p.regex)
                    .map_err(|e| anyhow!("gazetteer pattern `{}` regex error: {}", p.regex, e))?;
                Ok((re, p.label))
            })
            .collect::<Result<Vec<_>>>()?;
        if patterns.is_empty() {
            return Err(anyhow!("entity gazetteer has no patterns"));
        }
        Ok(Self { patterns })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading entity gazetteer from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut out = Vec::new();
        for (re, label) in &self.patterns {
            for m in re.find_iter(text) {
                out.push(RecognizedEntity {
                    text: m.as_str().to_string(),
                    label: label.clone(),
                });
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "gazetteer"
    }
}

/* ----------------------------
Aggregation
---------------------------- */

/// Canonical entities in `title`, deduplicated, in the order the recognizer reports them.
pub fn title_entities(recognizer: &dyn EntityRecognizer, title: &str) -> Vec<String> {
    let mut ents: Vec<String> = Vec::new();
    for e in recognizer.recognize(title) {
        let Some(category) = EntityCategory::from_label(&e.label) else {
            continue;
        };
        let canon = canonicalize(&e.text);
        if !canon.is_empty() && !ents.contains(&canon) {
            tracing::trace!(target: "trending", entity = %canon, category = category.label());
            ents.push(canon);
        }
    }
    ents
}

/// Entities mentioned by at least `min_sources` distinct sources.
pub fn trending_entities(
    entries: &[Entry],
    recognizer: &dyn EntityRecognizer,
    min_sources: usize,
) -> Vec<TrendingResult> {
    let mut tally = TopicTally::default();
    for e in entries {
        let title = e.title.trim();
        if title.is_empty() {
            continue;
        }
        for ent in title_entities(recognizer, title) {
            tally.record(&ent, &e.source, title);
        }
    }
    let ranked = tally.into_ranked(min_sources);
    tracing::debug!(
        target: "trending",
        recognizer = recognizer.name(),
        entities = ranked.len(),
        min_sources,
        "entity trending"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_short_forms() {
        assert_eq!(canonicalize("U.S."), "US");
        assert_eq!(canonicalize("United States"), "US");
        assert_eq!(canonicalize(" Britain "), "UK");
        assert_eq!(canonicalize("European Union"), "EU");
    }

    #[test]
    fn short_whitelisted_spans_are_uppercased() {
        assert_eq!(canonicalize("Eu"), "EU");
        assert_eq!(canonicalize("ai"), "AI");
        // not whitelisted: kept as extracted
        assert_eq!(canonicalize("Xi"), "Xi");
        assert_eq!(canonicalize("Kyiv"), "Kyiv");
    }

    #[test]
    fn unknown_labels_are_ignored() {
        assert!(EntityCategory::from_label("DATE").is_none());
        assert_eq!(
            EntityCategory::from_label("gpe"),
            Some(EntityCategory::Geopolitical)
        );
        assert_eq!(EntityCategory::Organization.label(), "ORG");
    }

    #[test]
    fn gazetteer_without_patterns_is_rejected() {
        assert!(GazetteerRecognizer::from_json_str(r#"{"patterns": []}"#).is_err());
        assert!(GazetteerRecognizer::from_json_str("not json").is_err());
    }

    #[test]
    fn detect_disabled_and_missing_file() {
        let off = EntityCapability::detect(false, Path::new("config/entities.json"));
        assert!(off.recognizer().is_none());
        let missing = EntityCapability::detect(true, Path::new("__no_such_gazetteer__.json"));
        assert!(missing.recognizer().is_none());
    }
}
