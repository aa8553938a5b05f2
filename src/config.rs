//! Feed configuration loaded from `feeds.yaml`.
//!
//! Maps topic-area slugs to ordered lists of sources, plus the global
//! settings the serializers need (site base, home URL, per-area item cap).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

fn default_max_items() -> usize {
    50
}

fn default_source_limit() -> usize {
    20
}

/// How the index document of a source is ingested.
///
/// Usually inferred from the index URL or from content sniffing; the config
/// can pin it explicitly for sources that defeat the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    Html,
    Feed,
}

/// One configured source inside a topic area.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// URL of the index page or upstream feed to scan for article links.
    pub index: String,
    /// Site base URL; candidate links must stay on this host.
    pub base: String,
    /// Preferred link prefix, tried before the generic heuristics.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Per-source cap on extracted links.
    #[serde(default = "default_source_limit")]
    pub limit: usize,
    /// Explicit ingestion mode, overriding URL- and content-based detection.
    #[serde(default)]
    pub mode: Option<IngestMode>,
    /// Display name for logs; defaults to the index URL.
    #[serde(default)]
    pub name: Option<String>,
}

impl SourceConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.index)
    }
}

/// Top-level configuration: global settings plus slug -> sources mapping.
///
/// `areas` is a `BTreeMap` so a run always processes areas in a stable
/// order regardless of YAML key order.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL the generated feed files will be served from.
    pub site_base: String,
    /// Human-facing homepage the feeds point back to.
    pub home_url: String,
    #[serde(default = "default_max_items")]
    pub max_items_per_area: usize,
    pub areas: BTreeMap<String, Vec<SourceConfig>>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a YAML string (useful for testing).
    pub fn from_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
