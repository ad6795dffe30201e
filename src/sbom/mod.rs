//! Baseline SBOM resolution for software assets.
//!
//! Software assets are detected heuristically ([`detect_software`]), matched
//! against a catalog of reference SBOMs ([`BaselineCatalog`]) and, on a
//! match, given an asset-scoped copy of the baseline document
//! ([`SbomResolver`]). Assets without a matching baseline are flagged for a
//! manual upload.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use inventory_enrich::model::{Asset, AssetCategory, BaselineIndex, BaselineSbom, Criticality};
//! use inventory_enrich::sbom::{BaselineCatalog, SbomResolver, SbomStatus, StaticBaselineSource};
//!
//! # tokio_test_block(async {
//! let baseline = BaselineSbom::new("b1", "react", "18.2.0", "react.json");
//! let source = StaticBaselineSource::new(BaselineIndex::from_baselines(vec![baseline]))
//!     .with_payload("react.json", serde_json::json!({"components": [{"name": "react"}]}));
//! let resolver = SbomResolver::new(Arc::new(BaselineCatalog::new(source)));
//!
//! let asset = Asset::new("a1", "react", AssetCategory::Software, Criticality::Medium);
//! let results = resolver.resolve_inventory(&[asset]).await;
//! assert_eq!(results[0].status, SbomStatus::AutoGenerated);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

mod catalog;
mod detection;
mod resolver;
mod source;

pub use catalog::BaselineCatalog;
pub use detection::{
    detect_ecosystem, detect_software, extract_version, SoftwareDetection, SoftwareType,
};
pub use resolver::{
    autogeneration_status, find_baseline, transform_baseline, AutogenerationStatus,
    SbomResolution, SbomResolver, SbomStatus,
};
#[cfg(feature = "http")]
pub use source::HttpBaselineSource;
pub use source::{source_from_config, BaselineSource, FileBaselineSource, StaticBaselineSource};
