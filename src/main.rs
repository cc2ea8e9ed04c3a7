//! Headline Trends: binary entrypoint.
//! Loads config, runs one fetch/merge/trending pass, prints the result, and
//! optionally saves a CSV snapshot.

use anyhow::Context;
use headline_trends::{export, Pipeline, PipelineConfig, Report, TrendingResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("headline_trends=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn print_trending(heading: &str, items: &[TrendingResult], empty_hint: &str) {
    println!("\n== {heading} ==");
    if items.is_empty() {
        println!("{empty_hint}");
        return;
    }
    for tr in items.iter().take(10) {
        println!("{} — {} sources", tr.topic, tr.source_count);
        for ex in &tr.sample_headlines {
            println!("  - {ex}");
        }
    }
}

fn print_report(report: &Report) {
    for notice in &report.notices {
        println!("! {notice}");
    }
    if report.is_empty() {
        return;
    }

    println!("Fetched {} article(s).", report.entries.len());
    println!("\n== Source mix ==");
    for (source, n) in &report.source_mix {
        println!("{n:>4}  {source}");
    }

    println!("\n== Headlines ==");
    for (i, e) in report.entries.iter().enumerate() {
        let label = report
            .classifications
            .get(i)
            .map(|c| c.label.as_str())
            .unwrap_or_default();
        println!("{:02}. [{}] {}", i + 1, e.source, e.title);
        println!("    {label} | {}", e.link);
    }

    let min = report.min_sources;
    print_trending(
        &format!("Trending — curated (>= {min} sources)"),
        &report.curated,
        "No curated trends yet. Try increasing article count or per-feed cap.",
    );
    if let Some(entities) = &report.entities {
        print_trending(
            &format!("Trending — entities (>= {min} sources)"),
            entities,
            "No auto-entity trends yet. Try increasing article count.",
        );
    }

    println!("\n== Top labels ==");
    for (label, n) in &report.top_labels {
        println!("{n:>4}  {label}");
    }
    println!("\n== Top tags ==");
    for (tag, n) in &report.top_tags {
        println!("{n:>4}  {tag}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default().context("loading pipeline config")?;
    let export_path = cfg.export_csv.clone();
    let pipeline = Pipeline::from_config(cfg)?;

    let report = pipeline.run().await;
    print_report(&report);

    if let Some(path) = export_path {
        if report.is_empty() {
            tracing::info!(target: "pipeline", "nothing to export");
        } else {
            export::write_csv(&report, &path)?;
        }
    }
    Ok(())
}
