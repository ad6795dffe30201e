//! Enrichment runs over an asset and data inventory.
//!
//! An [`EnrichmentOrchestrator`] runs one of two directions:
//!
//! - [`EnrichmentDirection::DataToAssets`]: asset discovery for the data
//!   records, then SBOM resolution over existing and discovered assets.
//! - [`EnrichmentDirection::AssetsToData`]: data classification from the
//!   assets, then SBOM resolution over the assets.
//!
//! Stage failures are collected in the result instead of aborting the run.
//!
//! # Example
//!
//! ```no_run
//! use inventory_enrich::config::AppConfig;
//! use inventory_enrich::enrichment::{EnrichmentDirection, EnrichmentOrchestrator};
//!
//! # async fn run() -> inventory_enrich::Result<()> {
//! let orchestrator = EnrichmentOrchestrator::from_config(&AppConfig::default())?;
//! let result = orchestrator
//!     .run(EnrichmentDirection::AssetsToData, &[], &[])
//!     .await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

mod orchestrator;

pub use orchestrator::{
    BidirectionalResult, EnrichmentDirection, EnrichmentOrchestrator, EnrichmentRunResult,
};
