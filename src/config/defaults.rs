//! Default values for inventory-enrich configuration.
//!
//! The confidence ratios are heuristic constants without a documented
//! derivation. They are exposed as configuration so they can be tuned, but
//! the defaults below should only change with product input.

use crate::model::AssetCategory;

/// Rules at or above this priority count as high-priority evidence.
pub const DEFAULT_HIGH_PRIORITY_THRESHOLD: u32 = 8;

/// Share of "high" records needed for an overall "high" classification confidence.
pub const DEFAULT_CLASSIFICATION_HIGH_RATIO: f64 = 0.6;

/// Share of "high" plus "medium" records needed for an overall "medium".
pub const DEFAULT_CLASSIFICATION_MEDIUM_RATIO: f64 = 0.7;

/// Share of high-confidence mappings needed for an overall "high" discovery confidence.
pub const DEFAULT_DISCOVERY_HIGH_RATIO: f64 = 0.7;

/// Share of high-confidence mappings needed for an overall "medium".
pub const DEFAULT_DISCOVERY_MEDIUM_RATIO: f64 = 0.4;

/// Category-only discovery matches stop once this many candidates exist.
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Node budget for one dependency forest.
pub const DEFAULT_MAX_TREE_NODES: usize = 100_000;

/// Baseline fetch timeout.
pub const DEFAULT_BASELINE_TIMEOUT_SECS: u64 = 30;

/// File name of the baseline index inside a baseline directory or URL root.
pub const BASELINE_INDEX_FILE: &str = "index.json";

/// Categories that qualify as category-only discovery matches.
#[must_use]
pub fn default_match_categories() -> Vec<AssetCategory> {
    vec![
        AssetCategory::Database,
        AssetCategory::Filesystem,
        AssetCategory::Application,
    ]
}
