//! Configuration types for inventory-enrich operations.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! keys it changes.

use super::defaults::*;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Classification rule engine settings
    pub classification: ClassificationConfig,
    /// Asset discovery settings
    pub discovery: DiscoveryConfig,
    /// Baseline SBOM source settings
    pub baselines: BaselineConfig,
    /// Dependency graph settings
    pub graph: GraphConfig,
    /// Output settings for the host binary
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Load additional classification rules from a YAML file.
    pub fn rules_file(mut self, path: Option<PathBuf>) -> Self {
        self.config.classification.rules_file = path;
        self
    }

    /// Fetch the baseline index over HTTP.
    pub fn baseline_url(mut self, url: impl Into<String>) -> Self {
        self.config.baselines.index_url = Some(url.into());
        self.config.baselines.directory = None;
        self
    }

    /// Read the baseline index from a local directory.
    pub fn baseline_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.baselines.directory = Some(dir.into());
        self.config.baselines.index_url = None;
        self
    }

    /// Treat a failed baseline index load as a stage error.
    pub const fn fail_on_baseline_error(mut self, fail: bool) -> Self {
        self.config.baselines.fail_on_error = fail;
        self
    }

    /// Limit dependency tree depth (0 = unlimited).
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.config.graph.max_depth = depth;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Classification rule engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClassificationConfig {
    /// YAML file with additional rules
    pub rules_file: Option<PathBuf>,
    /// Keep the built-in rules when a rules file is given
    pub include_default_rules: bool,
    /// Rules at or above this priority count as high-priority evidence
    pub high_priority_threshold: u32,
    /// Share of high-confidence records needed for an overall "high"
    #[schemars(range(min = 0.0, max = 1.0))]
    pub high_ratio: f64,
    /// Share of high+medium records needed for an overall "medium"
    #[schemars(range(min = 0.0, max = 1.0))]
    pub medium_ratio: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            rules_file: None,
            include_default_rules: true,
            high_priority_threshold: DEFAULT_HIGH_PRIORITY_THRESHOLD,
            high_ratio: DEFAULT_CLASSIFICATION_HIGH_RATIO,
            medium_ratio: DEFAULT_CLASSIFICATION_MEDIUM_RATIO,
        }
    }
}

/// Asset discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Category-only matches stop being added once this many candidates exist
    #[schemars(range(min = 1))]
    pub max_candidates: usize,
    /// Share of high-confidence records needed for an overall "high"
    #[schemars(range(min = 0.0, max = 1.0))]
    pub high_ratio: f64,
    /// Share of high-confidence records needed for an overall "medium"
    #[schemars(range(min = 0.0, max = 1.0))]
    pub medium_ratio: f64,
    /// Asset categories that qualify as category-only matches
    pub match_categories: Vec<crate::model::AssetCategory>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            high_ratio: DEFAULT_DISCOVERY_HIGH_RATIO,
            medium_ratio: DEFAULT_DISCOVERY_MEDIUM_RATIO,
            match_categories: default_match_categories(),
        }
    }
}

/// Where baseline SBOMs come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BaselineConfig {
    /// URL of the baseline `index.json`
    pub index_url: Option<String>,
    /// Local directory holding `index.json` and the payloads
    pub directory: Option<PathBuf>,
    /// Request timeout in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
    /// Report a failed index load as an enrichment error instead of
    /// continuing with no baselines
    pub fail_on_error: bool,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            index_url: None,
            directory: None,
            timeout_secs: DEFAULT_BASELINE_TIMEOUT_SECS,
            fail_on_error: false,
        }
    }
}

impl BaselineConfig {
    /// Whether any baseline source is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.index_url.is_some() || self.directory.is_some()
    }
}

/// Dependency forest construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum tree depth below a root (0 = unlimited)
    pub max_depth: usize,
    /// Resolve a reference by component name when no key matches and the
    /// name is unambiguous
    pub resolve_by_name: bool,
    /// Total node budget across the forest (0 = unlimited); shared
    /// dependencies are repeated per branch, so dense graphs need a cap
    pub max_nodes: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            resolve_by_name: true,
            max_nodes: DEFAULT_MAX_TREE_NODES,
        }
    }
}

/// Output format of the host binary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full result as JSON
    #[default]
    Json,
    /// Short human-readable summary
    Summary,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}
