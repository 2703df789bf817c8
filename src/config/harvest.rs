// src/config/harvest.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::ingest::types::DEFAULT_MAX_RESULTS;

pub const ENV_CONFIG_PATH: &str = "HARVEST_CONFIG_PATH";
pub const ENV_AFFILIATE_TAG: &str = "HARVEST_AFFILIATE_TAG";
pub const ENV_MAX_RESULTS: &str = "HARVEST_MAX_RESULTS";
pub const ENV_KEYWORDS: &str = "HARVEST_KEYWORDS";

pub const DEFAULT_TOML_PATH: &str = "config/harvest.toml";
pub const DEFAULT_JSON_PATH: &str = "config/harvest.json";

fn default_affiliate_tag() -> String {
    "ethancho-20".to_string()
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_keywords() -> Vec<String> {
    ["cosrx", "laneige", "macbook", "iphone"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_sources() -> Vec<String> {
    vec!["amazon".to_string(), "coupang".to_string()]
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_print_records() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvestConfig {
    /// Partner id appended as `tag=` on affiliate-capable sources.
    #[serde(default = "default_affiliate_tag")]
    pub affiliate_tag: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Searched in this order.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Registry names, visited in this order for every keyword.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where the JSON-lines partitions are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_print_records")]
    pub print_records: bool,
    /// Prometheus textfile written after each run, if set.
    #[serde(default)]
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            affiliate_tag: default_affiliate_tag(),
            max_results: default_max_results(),
            keywords: default_keywords(),
            sources: default_sources(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            output_dir: default_output_dir(),
            print_records: default_print_records(),
            metrics_textfile: None,
        }
    }
}

impl HarvestConfig {
    /// Trim/dedup lists and reject configs that can't run.
    pub fn sanitize(mut self) -> Result<Self> {
        self.affiliate_tag = self.affiliate_tag.trim().to_string();
        if self.affiliate_tag.is_empty() {
            bail!("affiliate_tag must not be empty");
        }
        self.keywords = clean_list(self.keywords);
        self.sources = clean_list(
            self.sources
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        );
        if self.sources.is_empty() {
            bail!("at least one source is required");
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        Ok(self)
    }

    /// Apply `HARVEST_*` overrides on top of file values.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(tag) = std::env::var(ENV_AFFILIATE_TAG) {
            self.affiliate_tag = tag;
        }
        if let Ok(n) = std::env::var(ENV_MAX_RESULTS) {
            self.max_results = n
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_RESULTS}={n} is not a count"))?;
        }
        if let Ok(kws) = std::env::var(ENV_KEYWORDS) {
            self.keywords = kws.split(',').map(str::to_string).collect();
        }
        Ok(self)
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<HarvestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))?;
    cfg.sanitize()
}

/// Load config using env var + fallbacks:
/// 1) $HARVEST_CONFIG_PATH
/// 2) config/harvest.toml
/// 3) config/harvest.json
/// 4) built-in defaults
///
/// `HARVEST_*` overrides are applied last.
pub fn load_config_default() -> Result<HarvestConfig> {
    let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        load_config_from(&pb)?
    } else if Path::new(DEFAULT_TOML_PATH).exists() {
        load_config_from(Path::new(DEFAULT_TOML_PATH))?
    } else if Path::new(DEFAULT_JSON_PATH).exists() {
        load_config_from(Path::new(DEFAULT_JSON_PATH))?
    } else {
        HarvestConfig::default()
    };
    base.apply_env()?.sanitize()
}

fn parse_config(s: &str, hint_ext: &str) -> Result<HarvestConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = serde_json::from_str(s) {
                return Ok(v);
            }
            toml::from_str(s).map_err(|e| anyhow!("unsupported config format: {e}"))
        }
    }
}

/// Trim, drop blanks, drop repeats. First occurrence wins so order is kept.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
