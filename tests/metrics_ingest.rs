// tests/metrics_ingest.rs
#![cfg(feature = "strict-metrics")]
use headline_trends::ingest::providers::RssFeedProvider;
use headline_trends::ingest::{fetch_headlines_round_robin, FetchOptions};
use headline_trends::FeedProvider;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;

#[tokio::test]
async fn metrics_exposed_after_fetch_and_merge() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("recorder");

    let xml = std::fs::read_to_string("tests/fixtures/world_rss.xml").expect("fixture");
    // Same feed twice so the merge has duplicates to drop.
    let providers: Vec<Box<dyn FeedProvider>> = vec![
        Box::new(RssFeedProvider::from_fixture("https://news.example.com/rss", &xml)),
        Box::new(RssFeedProvider::from_fixture("https://news.example.com/rss", &xml)),
    ];
    let opts = FetchOptions {
        total_limit: 10,
        per_feed_cap: None,
        dedupe: true,
        timeout: Duration::from_secs(5),
    };
    let merged = fetch_headlines_round_robin(&providers, opts).await;
    assert!(merged.duplicates > 0);

    // Scrape metrics text and check series presence by substring
    let out = handle.render();
    assert!(out.contains("ingest_feeds_total"));
    assert!(out.contains("ingest_entries_total"));
    assert!(out.contains("merge_duplicates_total"));
    assert!(out.contains("ingest_fetch_ms"));
    assert!(out.contains("ingest_parse_ms"));
}
