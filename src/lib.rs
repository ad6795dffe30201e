//! **Asset and data inventory enrichment.**
//!
//! `inventory-enrich` links two inventories that usually live apart: the
//! *assets* an organization runs (applications, databases, servers) and the
//! *data records* those assets hold. It fills the gaps in both directions.
//!
//! - **Data to assets**: records with no known supporting asset are matched
//!   against existing assets by location, owner and category, or get a
//!   synthesized supporting asset.
//! - **Assets to data**: a priority-ordered rule set suggests a sensitivity
//!   level for every record from the assets related to it, and software
//!   assets are matched against a catalog of baseline SBOMs.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: assets, data records, baseline index entries and the
//!   normalized [`SbomComponent`](model::SbomComponent).
//! - **[`parsers`]**: turns CycloneDX, SPDX and nested-bom payloads into one
//!   flat component list.
//! - **[`graph`]**: builds a cycle-safe dependency forest from components.
//! - **[`classification`]**: the rule engine behind classification suggestions.
//! - **[`discovery`]**: supporting-asset discovery for data records.
//! - **[`sbom`]**: software detection, the baseline catalog and SBOM resolution.
//! - **[`enrichment`]**: the orchestrator running all of the above per direction.
//!
//! ## Getting Started
//!
//! ```
//! use inventory_enrich::model::{Asset, AssetCategory, Criticality, DataRecord};
//! use inventory_enrich::{ClassificationEngine, ClassificationLevel};
//!
//! let assets = vec![
//!     Asset::new("a1", "Patient DB", AssetCategory::Database, Criticality::Medium)
//!         .with_data_type("PHI")
//!         .with_related_record("d1"),
//! ];
//! let records = vec![DataRecord::new("d1", "Lab results")];
//!
//! let result = ClassificationEngine::default().classify(&assets, &records);
//! assert_eq!(
//!     result.get("d1").map(|s| s.suggested_classification),
//!     Some(ClassificationLevel::Restricted)
//! );
//! ```
//!
//! ## Feature Flags
//!
//! - `http` (default): fetch the baseline index and payloads over HTTP with
//!   `reqwest`. Without it only directory and in-memory sources exist.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Ratios over item counts are computed in f64
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod classification;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod enrichment;
pub mod error;
pub mod graph;
pub mod model;
pub mod parsers;
pub mod sbom;

// Re-export main types for convenience
pub use classification::{ClassificationEngine, ClassificationResult, RuleSet};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, OutputConfig, Validatable};
pub use discovery::{AssetDiscoveryMatcher, DiscoveryResult};
pub use enrichment::{EnrichmentDirection, EnrichmentOrchestrator, EnrichmentRunResult};
pub use error::{EnrichError, ErrorContext, Result};
pub use graph::{DependencyForest, DependencyGraphBuilder};
pub use model::{
    Asset, AssetCategory, ClassificationLevel, ConfidenceTier, Criticality, DataRecord,
    SbomComponent,
};
pub use parsers::{normalize, normalize_str, ComponentNormalizer};
pub use sbom::{BaselineCatalog, SbomResolution, SbomResolver, SbomStatus};
