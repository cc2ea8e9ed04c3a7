// src/config/pipeline.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, time::Duration};

pub const ENV_CONFIG_PATH: &str = "HEADLINES_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";
pub const DEFAULT_ENTITIES_PATH: &str = "config/entities.json";

/// Article count used when `SAFE_MODE=1` and no explicit count is given.
pub const SAFE_MODE_LIMIT: usize = 20;

pub fn default_feeds() -> Vec<String> {
    [
        "https://www.aljazeera.com/xml/rss/all.xml",
        "http://feeds.bbci.co.uk/news/world/rss.xml",
        "https://rss.nytimes.com/services/xml/rss/nyt/World.xml",
        "https://www.rt.com/rss/news/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub feeds: Vec<String>,
    /// Max entries kept after the round-robin merge.
    pub total_limit: usize,
    /// Max raw entries taken from each feed; 0 means uncapped.
    pub per_feed_cap: usize,
    pub dedupe: bool,
    /// Distinct sources a topic needs to be reported as trending.
    pub min_sources: usize,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub auto_entities: bool,
    pub entities_path: PathBuf,
    /// Replaces the built-in curated taxonomy when set.
    pub topics_path: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            total_limit: 30,
            per_feed_cap: 100,
            dedupe: true,
            min_sources: 3,
            fetch_timeout_secs: 15,
            user_agent: concat!("headline-trends/", env!("CARGO_PKG_VERSION")).to_string(),
            auto_entities: false,
            entities_path: PathBuf::from(DEFAULT_ENTITIES_PATH),
            topics_path: None,
            export_csv: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve config:
    /// 1) $HEADLINES_CONFIG_PATH (must exist)
    /// 2) config/pipeline.toml
    /// 3) built-in defaults
    ///
    /// then apply env overrides and validate.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?
        } else {
            Self::default()
        };
        cfg.apply_overrides(|k| env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup` (normally the process env):
    /// `HEADLINES_FEEDS`, `SAFE_MODE`, `DEFAULT_ARTICLES`, `PER_FEED_CAP`,
    /// `MIN_SOURCES`, `AUTO_ENTITIES`, `EXPORT_CSV`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("HEADLINES_FEEDS") {
            self.feeds = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if get("SAFE_MODE").as_deref().is_some_and(parse_flag) {
            self.total_limit = self.total_limit.min(SAFE_MODE_LIMIT);
        }
        if let Some(v) = get("DEFAULT_ARTICLES") {
            self.total_limit = parse_usize("DEFAULT_ARTICLES", &v)?;
        }
        if let Some(v) = get("PER_FEED_CAP") {
            self.per_feed_cap = parse_usize("PER_FEED_CAP", &v)?;
        }
        if let Some(v) = get("MIN_SOURCES") {
            self.min_sources = parse_usize("MIN_SOURCES", &v)?;
        }
        if let Some(v) = get("AUTO_ENTITIES") {
            self.auto_entities = parse_flag(&v);
        }
        if let Some(v) = get("EXPORT_CSV") {
            self.export_csv = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Startup checks; the only errors that stop a run.
    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            bail!("no feeds configured");
        }
        if let Some(bad) = self.feeds.iter().find(|f| f.trim().is_empty()) {
            bail!("blank feed url in config: {bad:?}");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be > 0");
        }
        Ok(())
    }

    pub fn feed_cap(&self) -> Option<usize> {
        (self.per_feed_cap > 0).then_some(self.per_feed_cap)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_usize(key: &str, v: &str) -> Result<usize> {
    v.parse::<usize>()
        .map_err(|e| anyhow!("{key}={v:?} is not a non-negative integer: {e}"))
}
