use headline_trends::analyze::topics::CuratedMatcher;
use headline_trends::analyze::EntityCapability;
use headline_trends::export::{to_csv_string, write_csv};
use headline_trends::ingest::providers::RssFeedProvider;
use headline_trends::{FeedProvider, Pipeline, PipelineConfig};
use std::fs;

async fn fixture_report() -> headline_trends::Report {
    let xml = fs::read_to_string("tests/fixtures/world_rss.xml").expect("fixture");
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(RssFeedProvider::from_fixture(
        "https://news.example.com/world/rss.xml",
        &xml,
    ))];
    let cfg = PipelineConfig {
        min_sources: 1,
        ..Default::default()
    };
    Pipeline::new(
        cfg,
        providers,
        CuratedMatcher::global().clone(),
        EntityCapability::Unavailable {
            reason: "off".into(),
        },
    )
    .run()
    .await
}

#[tokio::test]
async fn one_row_per_entry_with_header() {
    let report = fixture_report().await;
    let csv = to_csv_string(&report);
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();

    assert_eq!(lines[0], "headline,source,link,label,tags");
    assert_eq!(lines.len(), report.entries.len() + 1);
    assert!(lines[1].starts_with("Ukraine and Russia resume grain talks,World Desk,"));
}

#[tokio::test]
async fn write_creates_parent_dirs() {
    let report = fixture_report().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshots").join("news.csv");

    write_csv(&report, &path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_csv_string(&report));
}
