//! Bidirectional enrichment runs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classification::{ClassificationEngine, ClassificationResult};
use crate::config::{AppConfig, Validatable};
use crate::discovery::{AssetDiscoveryMatcher, DiscoveryResult};
use crate::error::{EnrichError, ErrorContext, Result};
use crate::model::{Asset, BaselineSbom, DataRecord};
use crate::sbom::{source_from_config, BaselineCatalog, SbomResolution, SbomResolver, SbomStatus};

/// Which way an enrichment run infers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentDirection {
    /// Discover assets from data records
    DataToAssets,
    /// Classify data records from assets
    AssetsToData,
}

impl fmt::Display for EnrichmentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataToAssets => write!(f, "data-to-assets"),
            Self::AssetsToData => write!(f, "assets-to-data"),
        }
    }
}

/// Immutable snapshot of one enrichment run.
///
/// Stage failures land in `errors` and never discard the results of the
/// stages that did complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRunResult {
    pub direction: EnrichmentDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbom_results: Option<Vec<SbomResolution>>,
    pub timestamp: DateTime<Utc>,
    /// True only when `errors` is empty
    pub success: bool,
    pub errors: Vec<String>,
    /// Skipped inputs and other non-fatal notes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnrichmentRunResult {
    fn new(direction: EnrichmentDirection) -> Self {
        Self {
            direction,
            discovery: None,
            classification: None,
            sbom_results: None,
            timestamp: Utc::now(),
            success: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn finish(mut self) -> Self {
        self.success = self.errors.is_empty();
        self
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of SBOM results per status, in first-seen order.
    #[must_use]
    pub fn sbom_status_counts(&self) -> IndexMap<SbomStatus, usize> {
        let mut counts = IndexMap::new();
        for result in self.sbom_results.iter().flatten() {
            *counts.entry(result.status).or_insert(0) += 1;
        }
        counts
    }

    /// Log a summary of the run
    pub fn log_summary(&self) {
        tracing::info!(
            "Enrichment {} complete: success={}, {} errors, {} warnings",
            self.direction,
            self.success,
            self.errors.len(),
            self.warnings.len()
        );
        for err in &self.errors {
            tracing::warn!("Enrichment error: {}", err);
        }
    }
}

/// Results of running both directions over the same inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidirectionalResult {
    pub data_to_assets: EnrichmentRunResult,
    pub assets_to_data: EnrichmentRunResult,
}

impl BidirectionalResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.data_to_assets.success && self.assets_to_data.success
    }
}

/// Composes discovery, classification and SBOM resolution into runs.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOrchestrator {
    matcher: AssetDiscoveryMatcher,
    engine: ClassificationEngine,
    resolver: SbomResolver,
    fail_on_baseline_error: bool,
}

impl EnrichmentOrchestrator {
    #[must_use]
    pub fn new(
        matcher: AssetDiscoveryMatcher,
        engine: ClassificationEngine,
        resolver: SbomResolver,
    ) -> Self {
        Self {
            matcher,
            engine,
            resolver,
            fail_on_baseline_error: false,
        }
    }

    /// Build every stage from configuration.
    ///
    /// Out-of-range settings are rejected before anything is loaded.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            let messages: Vec<String> = problems.iter().map(ToString::to_string).collect();
            return Err(EnrichError::config(messages.join("; ")));
        }
        let engine = ClassificationEngine::from_config(&config.classification)
            .context("building classification engine")?;
        let catalog = match source_from_config(&config.baselines)? {
            Some(source) => BaselineCatalog::from_boxed(source),
            None => BaselineCatalog::default(),
        };
        Ok(Self {
            matcher: AssetDiscoveryMatcher::with_config(config.discovery.clone()),
            engine,
            resolver: SbomResolver::new(Arc::new(catalog)),
            fail_on_baseline_error: config.baselines.fail_on_error,
        })
    }

    /// Report a failed baseline index load as a run error.
    ///
    /// By default a failed load degrades to an empty baseline set.
    #[must_use]
    pub const fn with_fail_on_baseline_error(mut self, fail: bool) -> Self {
        self.fail_on_baseline_error = fail;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &SbomResolver {
        &self.resolver
    }

    /// Run one direction.
    pub async fn run(
        &self,
        direction: EnrichmentDirection,
        records: &[DataRecord],
        assets: &[Asset],
    ) -> EnrichmentRunResult {
        match direction {
            EnrichmentDirection::DataToAssets => self.data_to_assets(records, assets).await,
            EnrichmentDirection::AssetsToData => self.assets_to_data(assets, records).await,
        }
    }

    /// Discover assets for the data records, then resolve SBOMs for the
    /// existing and newly discovered assets.
    pub async fn data_to_assets(
        &self,
        records: &[DataRecord],
        assets: &[Asset],
    ) -> EnrichmentRunResult {
        let mut result = EnrichmentRunResult::new(EnrichmentDirection::DataToAssets);
        let records = sanitize(records, "data record", &mut result, |r| &r.id, DataRecord::is_well_formed);
        let assets = sanitize(assets, "asset", &mut result, |a| &a.id, Asset::is_well_formed);

        let discovery = self.matcher.discover(&records, &assets);
        let mut all_assets = assets;
        all_assets.extend(discovery.discovered_assets.iter().cloned());
        result.discovery = Some(discovery);

        result.sbom_results = self.sbom_stage(&all_assets, &mut result.errors).await;
        let result = result.finish();
        result.log_summary();
        result
    }

    /// Classify the data records from their assets, then resolve SBOMs for
    /// the assets.
    pub async fn assets_to_data(
        &self,
        assets: &[Asset],
        records: &[DataRecord],
    ) -> EnrichmentRunResult {
        let mut result = EnrichmentRunResult::new(EnrichmentDirection::AssetsToData);
        let assets = sanitize(assets, "asset", &mut result, |a| &a.id, Asset::is_well_formed);
        let records = sanitize(records, "data record", &mut result, |r| &r.id, DataRecord::is_well_formed);

        result.classification = Some(self.engine.classify(&assets, &records));
        result.sbom_results = self.sbom_stage(&assets, &mut result.errors).await;
        let result = result.finish();
        result.log_summary();
        result
    }

    /// Run both directions concurrently; they share one baseline index load.
    pub async fn run_bidirectional(
        &self,
        records: &[DataRecord],
        assets: &[Asset],
    ) -> BidirectionalResult {
        let (data_to_assets, assets_to_data) = tokio::join!(
            self.data_to_assets(records, assets),
            self.assets_to_data(assets, records)
        );
        BidirectionalResult {
            data_to_assets,
            assets_to_data,
        }
    }

    async fn sbom_stage(
        &self,
        assets: &[Asset],
        errors: &mut Vec<String>,
    ) -> Option<Vec<SbomResolution>> {
        let catalog = self.resolver.catalog();
        let index = if self.fail_on_baseline_error {
            match catalog.try_load_index().await {
                Ok(index) => index,
                Err(e) => {
                    errors.push(format!("SBOM processing failed: {e}"));
                    return None;
                }
            }
        } else {
            catalog.load_index().await
        };
        let baselines: &[BaselineSbom] = &index.baseline_sboms;
        Some(self.resolver.resolve_all(assets, baselines).await)
    }
}

/// Drop malformed items and repeated ids, keeping the first occurrence.
///
/// Malformed items are warnings; a repeated id is an error because the two
/// items cannot both be mapped.
fn sanitize<T, I, W>(
    items: &[T],
    kind: &str,
    result: &mut EnrichmentRunResult,
    id_of: I,
    well_formed: W,
) -> Vec<T>
where
    T: Clone,
    I: Fn(&T) -> &String,
    W: Fn(&T) -> bool,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !well_formed(item) {
            tracing::warn!("Skipping malformed {kind} at index {idx}");
            result
                .warnings
                .push(format!("Skipped malformed {kind} at index {idx}: missing id or name"));
            continue;
        }
        let id = id_of(item);
        if !seen.insert(id.clone()) {
            result.errors.push(format!("Duplicate {kind} id '{id}'"));
            continue;
        }
        kept.push(item.clone());
    }
    kept
}
