// src/ingest/merge.rs
//! Fair interleaving of per-feed entry lists with first-seen deduplication.

use std::collections::{HashMap, HashSet};

use metrics::counter;

use crate::ingest::types::Entry;

/// Lowercased, trimmed title plus the link's host. Equal keys are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub title: String,
    pub domain: String,
}

impl DedupeKey {
    pub fn of(entry: &Entry) -> Self {
        Self {
            title: entry.title.trim().to_lowercase(),
            domain: link_domain(&entry.link),
        }
    }
}

/// Host (and explicit non-default port) of `link`; empty when it does not parse.
pub fn link_domain(link: &str) -> String {
    let Ok(url) = url::Url::parse(link.trim()) else {
        return String::new();
    };
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Visits lists in fixed cyclic order, yielding `(list_index, item)` one item
/// per visit and skipping exhausted lists, until every list is drained.
pub struct RoundRobin<'a, T> {
    lists: &'a [Vec<T>],
    cursors: Vec<usize>,
    next: usize,
    remaining: usize,
}

pub fn round_robin<T>(lists: &[Vec<T>]) -> RoundRobin<'_, T> {
    RoundRobin {
        lists,
        cursors: vec![0; lists.len()],
        next: 0,
        remaining: lists.iter().map(Vec::len).sum(),
    }
}

impl<'a, T> Iterator for RoundRobin<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let lists = self.lists;
        // At least one list has an unread item, so this terminates within one cycle.
        loop {
            let i = self.next;
            self.next = (self.next + 1) % lists.len();
            if let Some(item) = lists[i].get(self.cursors[i]) {
                self.cursors[i] += 1;
                self.remaining -= 1;
                return Some((i, item));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub entries: Vec<Entry>,
    /// Entries dropped because their key was already emitted.
    pub duplicates: usize,
}

/// Round-robin across `lists` until `total_limit` entries are collected or
/// all lists are drained. Duplicates (by `DedupeKey`) are skipped without
/// counting toward the limit when `dedupe` is on.
pub fn merge_round_robin(lists: &[Vec<Entry>], total_limit: usize, dedupe: bool) -> MergeOutcome {
    let mut out = MergeOutcome::default();
    if total_limit == 0 {
        return out;
    }

    let mut seen: HashSet<DedupeKey> = HashSet::new();
    for (_src, entry) in round_robin(lists) {
        if dedupe && !seen.insert(DedupeKey::of(entry)) {
            out.duplicates += 1;
            continue;
        }
        out.entries.push(entry.clone());
        if out.entries.len() >= total_limit {
            break;
        }
    }

    counter!("merge_duplicates_total").increment(out.duplicates as u64);
    tracing::debug!(
        target: "merge",
        kept = out.entries.len(),
        duplicates = out.duplicates,
        "round-robin merge done"
    );
    out
}

/// Entry count per source name, in first-seen order.
pub fn source_mix(entries: &[Entry]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for e in entries {
        match index.get(e.source.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(e.source.as_str(), order.len());
                order.push((e.source.clone(), 1));
            }
        }
    }
    order
}
