//! Flat tabular snapshot of a report (CSV, RFC 4180 quoting).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::pipeline::Report;

pub const CSV_HEADER: [&str; 5] = ["headline", "source", "link", "label", "tags"];

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_row<'a, I: IntoIterator<Item = &'a str>>(fields: I) -> String {
    let mut line = fields.into_iter().map(csv_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

/// One row per entry; tags joined with ", ".
pub fn to_csv_string(report: &Report) -> String {
    let mut out = csv_row(CSV_HEADER);
    for (i, e) in report.entries.iter().enumerate() {
        let label = report
            .classifications
            .get(i)
            .map(|c| c.label.as_str())
            .unwrap_or_default();
        let tags = report.tags.get(i).map(|t| t.join(", ")).unwrap_or_default();
        out.push_str(&csv_row([
            e.title.as_str(),
            e.source.as_str(),
            e.link.as_str(),
            label,
            tags.as_str(),
        ]));
    }
    out
}

pub fn write_csv(report: &Report, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, to_csv_string(report))
        .with_context(|| format!("writing csv snapshot to {}", path.display()))?;
    tracing::info!(target: "pipeline", path = %path.display(), rows = report.entries.len(), "snapshot saved");
    Ok(())
}
