use headline_trends::analyze::ner::{
    title_entities, EntityCapability, EntityRecognizer, GazetteerRecognizer, RecognizedEntity,
};
use headline_trends::{trending_entities, Entry};
use std::fs;

fn entry(title: &str, source: &str) -> Entry {
    Entry {
        title: title.into(),
        link: String::new(),
        summary: String::new(),
        published: String::new(),
        source: source.into(),
    }
}

/// Reports fixed spans for any title that contains them.
struct StubRecognizer(Vec<(&'static str, &'static str)>);

impl EntityRecognizer for StubRecognizer {
    fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        self.0
            .iter()
            .filter(|(span, _)| text.contains(span))
            .map(|(span, label)| RecognizedEntity {
                text: span.to_string(),
                label: label.to_string(),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[test]
fn us_aliases_merge_into_one_topic() {
    let rec = StubRecognizer(vec![("U.S.", "GPE"), ("United States", "GPE")]);
    let entries = vec![
        entry("U.S. imposes new tariffs", "BBC"),
        entry("United States weighs response", "NYT"),
    ];
    let out = trending_entities(&entries, &rec, 2);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].topic, "US");
    assert_eq!(out[0].source_count, 2);
    assert_eq!(
        out[0].sample_headlines,
        vec![
            "[BBC] U.S. imposes new tariffs",
            "[NYT] United States weighs response"
        ]
    );
}

#[test]
fn same_entity_twice_in_a_title_counts_once() {
    let rec = StubRecognizer(vec![("U.S.", "GPE"), ("USA", "GPE")]);
    let t = "U.S. and USA both named";
    assert_eq!(title_entities(&rec, t), vec!["US".to_string()]);

    let entries = vec![entry(t, "BBC")];
    let out = trending_entities(&entries, &rec, 1);
    assert_eq!(out[0].sample_headlines.len(), 1);
}

#[test]
fn labels_outside_the_category_set_are_dropped() {
    let rec = StubRecognizer(vec![("Monday", "DATE"), ("Kyiv", "GPE")]);
    let entries = vec![entry("Kyiv quiet on Monday", "A")];
    let out = trending_entities(&entries, &rec, 1);
    let topics: Vec<&str> = out.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(topics, vec!["Kyiv"]);
}

#[test]
fn blank_titles_are_skipped() {
    let rec = StubRecognizer(vec![("EU", "ORG")]);
    let entries = vec![entry("   ", "A"), entry("EU summit", "B")];
    let out = trending_entities(&entries, &rec, 1);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].sample_headlines, vec!["[B] EU summit"]);
}

#[test]
fn gazetteer_recognizer_extracts_spans_as_written() {
    let g = GazetteerRecognizer::from_json_str(
        r#"{ "patterns": [
            { "regex": "(?i)\\bunited states\\b", "label": "GPE" },
            { "regex": "\\bZelensky\\b", "label": "PERSON" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(g.len(), 2);
    let found = g.recognize("Zelensky meets United States envoy");
    assert!(found.contains(&RecognizedEntity {
        text: "United States".into(),
        label: "GPE".into()
    }));
    assert_eq!(
        title_entities(&g, "Zelensky meets United States envoy"),
        vec!["US".to_string(), "Zelensky".to_string()]
    );
}

#[test]
fn capability_loads_gazetteer_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entities.json");
    fs::write(
        &path,
        r#"{ "patterns": [ { "regex": "\\bNATO\\b", "label": "ORG" } ] }"#,
    )
    .unwrap();

    let cap = EntityCapability::detect(true, &path);
    let rec = cap.recognizer().expect("gazetteer should load");
    let entries = vec![entry("NATO meets", "A"), entry("NATO warns", "B")];
    let out = trending_entities(&entries, rec, 2);
    assert_eq!(out[0].topic, "NATO");

    // Present but switched off stays unavailable.
    assert!(EntityCapability::detect(false, &path).recognizer().is_none());
}

#[test]
fn bundled_gazetteer_parses() {
    let content = fs::read_to_string("config/entities.json").unwrap();
    let g = GazetteerRecognizer::from_json_str(&content).unwrap();
    assert_eq!(
        title_entities(&g, "U.S. and Britain back Ukraine"),
        vec!["UK".to_string(), "US".to_string(), "Ukraine".to_string()]
    );
}
