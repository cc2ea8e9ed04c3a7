//! Headline classification collaborators.
//!
//! Both collaborators map a batch of titles to an aligned batch of results.
//! Implementations are external; the keyword versions here are the fallback
//! that never fails.

use serde::Serialize;
use std::collections::HashMap;

pub const FALLBACK_LABEL: &str = "Geopolitical Risk";

/// Label → substring cues, in priority order for ties.
pub const LABEL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Geopolitical Risk",
        &[
            "sanction",
            "missile",
            "nato",
            "election",
            "border",
            "ceasefire",
            "treaty",
            "invasion",
        ],
    ),
    (
        "Civil Unrest",
        &["protest", "strike", "riot", "demonstration", "clash", "march"],
    ),
    (
        "Climate Signal",
        &[
            "climate",
            "heatwave",
            "wildfire",
            "drought",
            "flood",
            "hurricane",
            "emissions",
        ],
    ),
    (
        "Disinformation Watch",
        &[
            "propaganda",
            "misinformation",
            "disinformation",
            "troll",
            "bot",
            "fake news",
        ],
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    pub score: Option<f32>,
}

/// One label per title.
pub trait HeadlineClassifier: Send + Sync {
    fn classify(&self, titles: &[String]) -> Vec<Classification>;
    fn name(&self) -> &'static str;
}

/// Zero or more labels per title.
pub trait MultiLabelTagger: Send + Sync {
    fn tag(&self, titles: &[String]) -> Vec<Vec<String>>;
    fn name(&self) -> &'static str;
}

fn keyword_hits(title: &str) -> impl Iterator<Item = (&'static str, usize)> {
    let tl = title.to_lowercase();
    LABEL_KEYWORDS
        .iter()
        .map(move |(label, kws)| (*label, kws.iter().filter(|k| tl.contains(*k)).count()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn label_for(title: &str) -> &'static str {
        let mut best = (FALLBACK_LABEL, 0usize);
        for (label, hits) in keyword_hits(title) {
            if hits > best.1 {
                best = (label, hits);
            }
        }
        best.0
    }
}

impl HeadlineClassifier for KeywordClassifier {
    fn classify(&self, titles: &[String]) -> Vec<Classification> {
        titles
            .iter()
            .map(|t| Classification {
                label: Self::label_for(t).to_string(),
                score: None,
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTagger;

impl MultiLabelTagger for KeywordTagger {
    fn tag(&self, titles: &[String]) -> Vec<Vec<String>> {
        titles
            .iter()
            .map(|t| {
                keyword_hits(t)
                    .filter(|(_, hits)| *hits > 0)
                    .map(|(label, _)| label.to_string())
                    .collect()
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Force a collaborator's output to `expected` items: truncate extras, pad
/// missing ones with defaults. Returns a warning notice on mismatch.
pub fn align_results<T: Default>(
    mut results: Vec<T>,
    expected: usize,
    what: &str,
) -> (Vec<T>, Option<String>) {
    if results.len() == expected {
        return (results, None);
    }
    let notice = format!(
        "{what} results length ({}) != articles length ({expected}). Truncating.",
        results.len()
    );
    tracing::warn!(target: "classify", got = results.len(), expected, what, "result shape mismatch");
    results.truncate(expected);
    results.resize_with(expected, T::default);
    (results, Some(notice))
}

/// Top `n` labels by frequency; ties keep first-seen order.
pub fn top_labels<'a, I>(labels: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for label in labels {
        if label.is_empty() {
            continue;
        }
        match index.get(label) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(label, counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_picks_most_hits_and_defaults() {
        assert_eq!(
            KeywordClassifier::label_for("Wildfire and drought grip region"),
            "Climate Signal"
        );
        assert_eq!(KeywordClassifier::label_for("Quiet day"), FALLBACK_LABEL);
        // one hit each: first label in table order wins
        assert_eq!(
            KeywordClassifier::label_for("Protest near the border"),
            "Geopolitical Risk"
        );
    }

    #[test]
    fn tagger_returns_every_hit_label() {
        let titles = vec!["Climate protest turns into riot".to_string(), "Calm".into()];
        let tags = KeywordTagger.tag(&titles);
        assert_eq!(tags[0], vec!["Civil Unrest", "Climate Signal"]);
        assert!(tags[1].is_empty());
    }

    #[test]
    fn align_truncates_and_pads() {
        let (v, notice) = align_results(vec![1, 2, 3], 2, "NLP");
        assert_eq!(v, vec![1, 2]);
        assert!(notice.unwrap().contains("NLP results length (3)"));

        let (v, notice) = align_results(vec![7], 3, "ML");
        assert_eq!(v, vec![7, 0, 0]);
        assert!(notice.is_some());

        let (v, notice) = align_results(vec![1], 1, "ML");
        assert_eq!(v, vec![1]);
        assert!(notice.is_none());
    }

    #[test]
    fn top_labels_orders_by_count_then_first_seen() {
        let labels = ["b", "a", "a", "c", "b", ""];
        let top = top_labels(labels.iter().copied(), 2);
        assert_eq!(top, vec![("b".to_string(), 2), ("a".to_string(), 2)]);
    }
}
