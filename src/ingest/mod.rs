// src/ingest/mod.rs
pub mod error;
pub mod merge;
pub mod providers;
pub mod types;

use crate::ingest::error::FetchError;
use crate::ingest::merge::{merge_round_robin, MergeOutcome};
use crate::ingest::providers::{build_http_client, RssFeedProvider};
use crate::ingest::types::{Entry, FeedProvider, FeedSource, RawEntry, NO_TITLE};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::time::{Duration, Instant};

/// One-time metrics registration.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_feeds_total", "Feed fetches attempted.");
        describe_counter!(
            "ingest_feed_errors_total",
            "Feed fetches that failed or timed out."
        );
        describe_counter!(
            "ingest_entries_total",
            "Entries normalized from fetched feeds."
        );
        describe_counter!(
            "merge_duplicates_total",
            "Entries dropped by round-robin deduplication."
        );
        describe_histogram!("ingest_fetch_ms", "Per-feed fetch time in milliseconds.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the pipeline last ran."
        );
    });
}

/// Options for one fetch-and-merge pass.
#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    pub total_limit: usize,
    /// Applied to raw entries, in delivered order, before normalization.
    pub per_feed_cap: Option<usize>,
    pub dedupe: bool,
    pub timeout: Duration,
}

/// Normalize one raw entry. Title falls back to `NO_TITLE`, summary to
/// description, published to updated; everything else to empty.
pub fn normalize_entry(raw: RawEntry, source: &FeedSource) -> Entry {
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_TITLE)
        .to_string();

    Entry {
        title,
        link: raw.link.map(|l| l.trim().to_string()).unwrap_or_default(),
        summary: first_non_empty([raw.summary, raw.description]),
        published: first_non_empty([raw.published, raw.updated]),
        source: source.name.clone(),
    }
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Fetch one feed. Never fails: errors, timeouts and unparseable documents are
/// logged and yield no entries; a malformed document keeps whatever was parsed
/// before the break.
pub async fn fetch_one(
    provider: &dyn FeedProvider,
    cap: Option<usize>,
    timeout: Duration,
) -> Vec<Entry> {
    let url = provider.url();
    let t0 = Instant::now();
    let fetched = match tokio::time::timeout(timeout, provider.fetch_raw()).await {
        Ok(res) => res,
        Err(_) => Err(FetchError::Timeout(timeout).into()),
    };
    histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    // A broken document with nothing salvageable counts as a failed fetch.
    let fetched = fetched.and_then(|raw| {
        if raw.entries.is_empty() {
            if let Some(reason) = raw.malformed {
                return Err(FetchError::Parse(reason).into());
            }
        }
        Ok(raw)
    });

    let raw = match fetched {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(target: "ingest", feed = %url, error = ?e, "feed fetch failed");
            counter!("ingest_feed_errors_total").increment(1);
            return Vec::new();
        }
    };

    if let Some(reason) = raw.malformed.as_deref() {
        tracing::warn!(
            target: "ingest",
            feed = %url,
            parsed = raw.entries.len(),
            reason,
            "malformed feed, keeping entries parsed so far"
        );
    }

    let source = FeedSource::new(url, raw.title.as_deref());
    let entries: Vec<Entry> = raw
        .entries
        .into_iter()
        .take(cap.unwrap_or(usize::MAX))
        .map(|e| normalize_entry(e, &source))
        .collect();

    counter!("ingest_entries_total").increment(entries.len() as u64);
    entries
}

/// Fetch every feed concurrently. Output order follows `providers`.
pub async fn fetch_all(
    providers: &[Box<dyn FeedProvider>],
    cap: Option<usize>,
    timeout: Duration,
) -> Vec<Vec<Entry>> {
    ensure_metrics_described();
    counter!("ingest_feeds_total").increment(providers.len() as u64);

    let per_source = join_all(
        providers
            .iter()
            .map(|p| fetch_one(p.as_ref(), cap, timeout)),
    )
    .await;

    let counts: Vec<(&str, usize)> = providers
        .iter()
        .zip(&per_source)
        .map(|(p, entries)| (p.url(), entries.len()))
        .collect();
    tracing::info!(target: "ingest", counts = ?counts, "fetched counts");

    per_source
}

/// Fetch all feeds, then round-robin merge them.
pub async fn fetch_headlines_round_robin(
    providers: &[Box<dyn FeedProvider>],
    opts: FetchOptions,
) -> MergeOutcome {
    let per_source = fetch_all(providers, opts.per_feed_cap, opts.timeout).await;
    merge_round_robin(&per_source, opts.total_limit, opts.dedupe)
}

/// Single-feed helper: up to `limit` entries from `url`.
pub async fn fetch_headlines(
    url: &str,
    limit: usize,
    user_agent: &str,
    timeout: Duration,
) -> anyhow::Result<Vec<Entry>> {
    let client = build_http_client(user_agent, timeout)?;
    let providers: Vec<Box<dyn FeedProvider>> =
        vec![Box::new(RssFeedProvider::from_url(url, client))];
    let opts = FetchOptions {
        total_limit: limit,
        per_feed_cap: Some(limit),
        dedupe: true,
        timeout,
    };
    Ok(fetch_headlines_round_robin(&providers, opts).await.entries)
}
