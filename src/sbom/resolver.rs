//! Baseline SBOM resolution for software assets.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};

use super::catalog::BaselineCatalog;
use super::detection::{detect_software, SoftwareDetection};
use crate::error::{EnrichError, ParseErrorKind, Result};
use crate::model::{Asset, BaselineSbom, ConfidenceTier};
use crate::parsers::ComponentNormalizer;

/// Outcome of resolving one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SbomStatus {
    /// A baseline matched and was stamped for the asset
    AutoGenerated,
    /// No baseline matched; the SBOM must be supplied by hand
    UploadRequired,
    /// The asset already carries SBOM data
    AlreadyExists,
    NotSoftware,
    /// Fetching or reading the matched baseline failed
    Error,
}

impl SbomStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoGenerated => "auto-generated",
            Self::UploadRequired => "upload-required",
            Self::AlreadyExists => "already-exists",
            Self::NotSoftware => "not-software",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SbomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-asset resolution result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SbomResolution {
    pub asset_id: String,
    pub asset_name: String,
    pub status: SbomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_match: Option<BaselineSbom>,
    /// The asset-scoped SBOM document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbom_data: Option<Value>,
    /// Number of components the normalizer found in `sbom_data`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl SbomResolution {
    fn new(asset: &Asset, status: SbomStatus, message: String) -> Self {
        Self {
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            status,
            baseline_match: None,
            sbom_data: None,
            component_count: None,
            error: None,
            message,
        }
    }

    fn already_exists(asset: &Asset) -> Self {
        Self::new(
            asset,
            SbomStatus::AlreadyExists,
            format!("Asset \"{}\" already has SBOM data", asset.name),
        )
    }

    fn failed(asset: &Asset, baseline: &BaselineSbom, err: &EnrichError) -> Self {
        let mut resolution = Self::new(
            asset,
            SbomStatus::Error,
            format!("Failed to auto-generate SBOM for \"{}\": {err}", asset.name),
        );
        resolution.baseline_match = Some(baseline.clone());
        resolution.error = Some(err.to_string());
        resolution
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == SbomStatus::Error
    }
}

/// Whether an asset needs, has, or can automatically get an SBOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutogenerationStatus {
    pub needs_sbom: bool,
    pub has_sbom: bool,
    pub can_autogenerate: bool,
    pub message: String,
}

/// Report an asset's SBOM situation without fetching anything.
#[must_use]
pub fn autogeneration_status(asset: &Asset) -> AutogenerationStatus {
    let detection = detect_software(asset);
    let has_sbom = asset.has_sbom();
    let needs_sbom = detection.is_software();
    let can_autogenerate =
        needs_sbom && !has_sbom && detection.confidence != ConfidenceTier::Low;

    let message = if has_sbom {
        "SBOM already exists"
    } else if !needs_sbom {
        "Not a software asset"
    } else if can_autogenerate {
        "Can auto-generate from baseline"
    } else {
        "Upload required"
    };

    AutogenerationStatus {
        needs_sbom,
        has_sbom,
        can_autogenerate,
        message: message.to_string(),
    }
}

/// Pick the baseline for a detected software asset.
///
/// A case-insensitive name match (equal or contained either way) wins.
/// Otherwise, when an ecosystem was detected, an ecosystem baseline whose
/// version equals the detected version is preferred, then the first one.
#[must_use]
pub fn find_baseline<'a>(
    asset: &Asset,
    detection: &SoftwareDetection,
    baselines: &'a [BaselineSbom],
) -> Option<&'a BaselineSbom> {
    if !detection.is_software() {
        return None;
    }

    let asset_name = asset.name.trim().to_lowercase();
    if !asset_name.is_empty() {
        let by_name = baselines.iter().find(|b| {
            let name = b.name.trim().to_lowercase();
            !name.is_empty()
                && (name == asset_name || name.contains(&asset_name) || asset_name.contains(&name))
        });
        if by_name.is_some() {
            return by_name;
        }
    }

    let ecosystem = detection.ecosystem.as_deref()?;
    let candidates: Vec<&BaselineSbom> = baselines
        .iter()
        .filter(|b| b.effective_ecosystem().as_deref() == Some(ecosystem))
        .collect();

    if let Some(ref version) = detection.version {
        if let Some(hit) = candidates.iter().copied().find(|b| &b.version == version) {
            return Some(hit);
        }
    }
    candidates.first().copied()
}

/// Stamp a baseline SBOM document for an asset.
///
/// The metadata component (when present) takes the asset's name and the
/// baseline's version, and an `assetReference` block records provenance.
pub fn transform_baseline(
    payload: &Value,
    asset: &Asset,
    baseline: &BaselineSbom,
) -> Result<Value> {
    let Value::Object(ref document) = *payload else {
        return Err(EnrichError::parse(
            format!("baseline SBOM '{}'", baseline.name),
            ParseErrorKind::InvalidValue {
                field: "root".to_string(),
                message: "expected a JSON object".to_string(),
            },
        ));
    };

    let mut document = document.clone();
    if let Some(component) = document
        .get_mut("metadata")
        .and_then(|m| m.get_mut("component"))
        .and_then(Value::as_object_mut)
    {
        component.insert("name".to_string(), Value::String(asset.name.clone()));
        component.insert("version".to_string(), Value::String(baseline.version.clone()));
    }

    document.insert(
        "assetReference".to_string(),
        json!({
            "assetId": asset.id,
            "assetName": asset.name,
            "baselineSource": baseline.name,
            "generatedAt": Utc::now().to_rfc3339(),
        }),
    );
    Ok(Value::Object(document))
}

/// Resolves software assets against the baseline catalog.
#[derive(Debug, Clone)]
pub struct SbomResolver {
    catalog: Arc<BaselineCatalog>,
    normalizer: ComponentNormalizer,
}

impl Default for SbomResolver {
    fn default() -> Self {
        Self::new(Arc::new(BaselineCatalog::default()))
    }
}

impl SbomResolver {
    #[must_use]
    pub fn new(catalog: Arc<BaselineCatalog>) -> Self {
        Self {
            catalog,
            normalizer: ComponentNormalizer::default(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &BaselineCatalog {
        &self.catalog
    }

    /// Resolve one asset against the given baselines.
    ///
    /// Never fails: fetch and parse problems become [`SbomStatus::Error`].
    /// Assets that already carry SBOM data are never fetched for.
    pub async fn resolve(&self, asset: &Asset, baselines: &[BaselineSbom]) -> SbomResolution {
        if asset.has_sbom() {
            return SbomResolution::already_exists(asset);
        }

        let detection = detect_software(asset);
        if !detection.is_software() {
            return SbomResolution::new(
                asset,
                SbomStatus::NotSoftware,
                format!("Asset \"{}\" is not a software asset", asset.name),
            );
        }

        let Some(baseline) = find_baseline(asset, &detection, baselines) else {
            tracing::debug!("No baseline for '{}'", asset.name);
            return SbomResolution::new(
                asset,
                SbomStatus::UploadRequired,
                format!(
                    "No baseline SBOM found for \"{}\". Please upload SBOM manually.",
                    asset.name
                ),
            );
        };

        tracing::debug!("Matched '{}' to baseline '{}'", asset.name, baseline.name);
        match self.generate(asset, baseline).await {
            Ok((sbom, component_count)) => {
                let mut resolution = SbomResolution::new(
                    asset,
                    SbomStatus::AutoGenerated,
                    format!(
                        "SBOM auto-generated for \"{}\" using baseline \"{}\"",
                        asset.name, baseline.name
                    ),
                );
                resolution.baseline_match = Some(baseline.clone());
                resolution.sbom_data = Some(sbom);
                resolution.component_count = Some(component_count);
                resolution
            }
            Err(e) => {
                tracing::warn!("Baseline resolution failed for '{}': {e}", asset.name);
                SbomResolution::failed(asset, baseline, &e)
            }
        }
    }

    async fn generate(&self, asset: &Asset, baseline: &BaselineSbom) -> Result<(Value, usize)> {
        let payload = self.catalog.fetch_payload(baseline).await?;
        let sbom = transform_baseline(&payload, asset, baseline)?;
        let count = self.normalizer.normalize(&sbom).len();
        Ok((sbom, count))
    }

    /// Resolve every software asset concurrently.
    ///
    /// Assets detection does not consider software are skipped. Results keep
    /// input order and one asset's failure never affects another's.
    pub async fn resolve_all(
        &self,
        assets: &[Asset],
        baselines: &[BaselineSbom],
    ) -> Vec<SbomResolution> {
        let pending = assets
            .iter()
            .filter(|asset| detect_software(asset).is_software())
            .map(|asset| self.resolve(asset, baselines));
        let results = join_all(pending).await;

        tracing::info!(
            "Resolved {} software assets ({} auto-generated)",
            results.len(),
            results
                .iter()
                .filter(|r| r.status == SbomStatus::AutoGenerated)
                .count()
        );
        results
    }

    /// Resolve against the catalog's baselines, degrading to none on load failure.
    pub async fn resolve_inventory(&self, assets: &[Asset]) -> Vec<SbomResolution> {
        let index = self.catalog.load_index().await;
        self.resolve_all(assets, &index.baseline_sboms).await
    }
}
