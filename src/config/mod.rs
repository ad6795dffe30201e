//! Configuration module for inventory-enrich.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use inventory_enrich::config::AppConfig;
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .baseline_directory("./baseline-sboms")
//!     .max_depth(8)
//!     .build();
//!
//! // Load from file
//! use inventory_enrich::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.inventory-enrich.yaml` file in your project root or
//! `~/.config/inventory-enrich/`:
//!
//! ```yaml
//! classification:
//!   rules_file: ./classification-rules.yaml
//! baselines:
//!   directory: ./baseline-sboms
//! discovery:
//!   max_candidates: 5
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    default_match_categories, BASELINE_INDEX_FILE, DEFAULT_BASELINE_TIMEOUT_SECS,
    DEFAULT_CLASSIFICATION_HIGH_RATIO, DEFAULT_CLASSIFICATION_MEDIUM_RATIO,
    DEFAULT_DISCOVERY_HIGH_RATIO, DEFAULT_DISCOVERY_MEDIUM_RATIO, DEFAULT_HIGH_PRIORITY_THRESHOLD,
    DEFAULT_MAX_CANDIDATES, DEFAULT_MAX_TREE_NODES,
};
pub use types::{
    AppConfig, AppConfigBuilder, BaselineConfig, ClassificationConfig, DiscoveryConfig,
    GraphConfig, OutputConfig, OutputFormat,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.inventory-enrich.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
