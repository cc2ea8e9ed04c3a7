use headline_trends::analyze::topics::{CuratedMatcher, Taxonomy};
use headline_trends::{trending_curated, Entry};

fn entry(title: &str, source: &str) -> Entry {
    Entry {
        title: title.into(),
        link: String::new(),
        summary: String::new(),
        published: String::new(),
        source: source.into(),
    }
}

#[test]
fn two_sources_on_ukraine_meet_threshold_two() {
    let entries = vec![
        entry("Ukraine war enters new phase", "BBC"),
        entry("Aid convoy reaches Ukraine", "Al Jazeera"),
        entry("Markets open flat", "NYT"),
    ];
    let out = trending_curated(&entries, 2);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].topic, "Ukraine");
    assert_eq!(out[0].source_count, 2);
    assert_eq!(
        out[0].sample_headlines,
        vec![
            "[BBC] Ukraine war enters new phase",
            "[Al Jazeera] Aid convoy reaches Ukraine"
        ]
    );
}

#[test]
fn threshold_is_inclusive() {
    let entries = vec![
        entry("China trade data", "A"),
        entry("China exports rise", "B"),
        entry("China and Taiwan", "C"),
    ];
    let at = trending_curated(&entries, 3);
    assert!(at.iter().any(|t| t.topic == "China" && t.source_count == 3));
    let above = trending_curated(&entries, 4);
    assert!(above.iter().all(|t| t.topic != "China"));
}

#[test]
fn rate_hikes_phrase_matches_but_corporate_rate_does_not() {
    let m = CuratedMatcher::global();
    let hits: Vec<&str> = m.topics_for("Rate hikes expected").collect();
    assert_eq!(hits, vec!["Interest Rates"]);
    assert_eq!(m.topics_for("corporate rate").count(), 0);
    assert_eq!(
        m.topics_for("Interest-rate path unclear").collect::<Vec<_>>(),
        vec!["Interest Rates"]
    );
}

#[test]
fn source_repeating_a_topic_counts_once() {
    let entries = vec![
        entry("Oil rallies", "BBC"),
        entry("Oil slips", "BBC"),
        entry("OPEC meets", "BBC"),
        entry("Oil steady", "RT"),
    ];
    let out = trending_curated(&entries, 1);
    let oil = out.iter().find(|t| t.topic == "Oil").unwrap();
    assert_eq!(oil.source_count, 2);
    assert_eq!(
        oil.sample_headlines,
        vec!["[BBC] Oil rallies", "[BBC] Oil slips", "[BBC] OPEC meets"]
    );
}

#[test]
fn ranking_is_by_source_count_then_first_discovery() {
    let entries = vec![
        entry("Gaza aid talks", "A"),
        entry("Iran responds", "A"),
        entry("Iran sanctions", "B"),
        entry("Gaza ceasefire", "B"),
        entry("Iran oil exports", "C"),
        entry("Protest in Tehran", "A"),
        entry("Protest grows", "B"),
    ];
    let out = trending_curated(&entries, 2);
    let ranked: Vec<(&str, usize)> = out
        .iter()
        .map(|t| (t.topic.as_str(), t.source_count))
        .collect();
    assert_eq!(ranked, vec![("Iran", 3), ("Gaza", 2), ("Protest", 2)]);
}

#[test]
fn repeated_runs_are_identical() {
    let entries = vec![
        entry("NATO summit opens", "A"),
        entry("Putin warns NATO", "B"),
        entry("Russia and NATO", "C"),
        entry("Putin visits China", "A"),
    ];
    let first = trending_curated(&entries, 1);
    for _ in 0..5 {
        assert_eq!(trending_curated(&entries, 1), first);
    }
}

#[test]
fn custom_taxonomy_replaces_seed() {
    let taxonomy = Taxonomy::from_toml_str(
        r#"
[[topics]]
name = "Elections"
keywords = ["election", "run-off"]
"#,
    )
    .unwrap();
    let m = CuratedMatcher::new(&taxonomy).unwrap();
    let entries = vec![
        entry("Run off vote set for June", "A"),
        entry("Election board certifies", "B"),
        entry("Ukraine update", "C"),
    ];
    let out = m.trending(&entries, 2);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].topic, "Elections");
}
