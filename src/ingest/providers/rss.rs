// src/ingest/providers/rss.rs
//! RSS 2.0 / RSS 1.0 / Atom provider.
//!
//! Parsing is a single lenient pass over `quick-xml` events instead of a serde
//! schema, so that truncated or garbled documents still give up the entries
//! that were complete before the break.

use anyhow::Result;
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::time::Duration;

use crate::ingest::error::FetchError;
use crate::ingest::types::{FeedProvider, RawEntry, RawFeed};

pub struct RssFeedProvider {
    url: String,
    mode: Mode,
}

enum Mode {
    // Keeps its own copy so tests can hand in decoded strings.
    Fixture(String),
    Http(reqwest::Client),
}

impl RssFeedProvider {
    pub fn from_url(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            mode: Mode::Http(client),
        }
    }

    /// Serve a fixed XML document under `url` (tests, offline runs).
    pub fn from_fixture(url: &str, xml: &str) -> Self {
        Self {
            url: url.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }
}

/// Shared HTTP client for all feed fetches.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_raw(&self) -> Result<RawFeed> {
        match &self.mode {
            Mode::Fixture(xml) => Ok(parse_timed(xml)),
            Mode::Http(client) => {
                let resp = client.get(&self.url).send().await.map_err(FetchError::Http)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()).into());
                }
                let body = resp.text().await.map_err(FetchError::Http)?;
                Ok(parse_timed(&body))
            }
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

fn parse_timed(xml: &str) -> RawFeed {
    let t0 = std::time::Instant::now();
    let feed = parse_feed(xml);
    histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    feed
}

/// Parse an RSS or Atom document.
///
/// Never fails: a syntax error, a mismatched end tag, or an element left open
/// at end of input is reported in `RawFeed::malformed`, with every entry closed
/// before it kept. A document whose root is not `rss`, `feed` or `rdf:RDF` is
/// not a feed: it yields no entries and is reported as malformed.
pub fn parse_feed(xml: &str) -> RawFeed {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut feed = RawFeed::default();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut text = String::new();
    let mut root: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                root.get_or_insert_with(|| name.clone());
                if is_entry_tag(&name) && current.is_none() {
                    current = Some(RawEntry::default());
                } else if name == "link" {
                    if let Some(entry) = current.as_mut() {
                        take_link_href(entry, &e);
                    }
                }
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                if name == "link" {
                    if let Some(entry) = current.as_mut() {
                        take_link_href(entry, &e);
                    }
                }
                root.get_or_insert(name);
            }
            Ok(Event::Text(t)) => {
                let raw = String::from_utf8_lossy(&t);
                text.push_str(&html_escape::decode_html_entities(&raw));
            }
            Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::End(e)) => {
                let closing = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let Some(name) = path.pop() else {
                    feed.malformed
                        .get_or_insert_with(|| format!("unexpected end tag </{closing}>"));
                    continue;
                };
                if closing != name && feed.malformed.is_none() {
                    feed.malformed = Some(format!(
                        "mismatched end tag </{closing}>, expected </{name}>"
                    ));
                }
                let value = std::mem::take(&mut text);
                let parent = path.last().map(String::as_str).unwrap_or_default();

                if is_entry_tag(&name) {
                    if let Some(done) = current.take() {
                        feed.entries.push(done);
                    }
                } else if let Some(entry) = current.as_mut() {
                    if is_entry_tag(parent) {
                        assign_field(entry, &name, value);
                    }
                } else if name == "title" && matches!(parent, "channel" | "feed") {
                    feed.title.get_or_insert(value);
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = path.last() {
                    feed.malformed
                        .get_or_insert_with(|| format!("document ended inside <{open}>"));
                }
                break;
            }
            Err(e) => {
                feed.malformed = Some(e.to_string());
                break;
            }
            Ok(_) => {}
        }
    }

    match root.as_deref() {
        Some("rss" | "feed" | "RDF") => {}
        other => {
            feed.entries.clear();
            feed.title = None;
            feed.malformed = Some(match other {
                Some(name) => format!("not a feed document (root element <{name}>)"),
                None => "not a feed document (no root element)".to_string(),
            });
        }
    }

    feed
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_entry_tag(name: &str) -> bool {
    matches!(name, "item" | "entry")
}

/// Atom `<link href=".." rel="alternate"/>`; first alternate (or rel-less) link wins.
fn take_link_href(entry: &mut RawEntry, e: &BytesStart<'_>) {
    if entry.link.is_some() {
        return;
    }
    let mut href = None;
    let mut alternate = true;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(html_escape::decode_html_entities(&value).trim().to_string()),
            b"rel" => alternate = value.trim() == "alternate",
            _ => {}
        }
    }
    if alternate {
        entry.link = href.filter(|h| !h.is_empty());
    }
}

fn assign_field(entry: &mut RawEntry, name: &str, value: String) {
    let slot = match name {
        "title" => &mut entry.title,
        "link" => &mut entry.link,
        "summary" => &mut entry.summary,
        "description" => &mut entry.description,
        "pubDate" | "published" | "issued" => &mut entry.published,
        "updated" | "date" | "modified" => &mut entry.updated,
        _ => return,
    };
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}
