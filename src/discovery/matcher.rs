//! Asset discovery: linking data records to the assets that host them.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::DiscoveryConfig;
use crate::model::{Asset, AssetCategory, ConfidenceTier, DataRecord};

/// Why an asset became a candidate for a data record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchReason {
    /// Location overlaps and the owner is the same
    LocationAndOwner,
    /// Location overlaps
    Location,
    /// Category is one that typically hosts data
    Category,
    /// No existing asset matched; the asset was proposed
    Synthesized,
}

impl MatchReason {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LocationAndOwner => "location and owner",
            Self::Location => "location",
            Self::Category => "category",
            Self::Synthesized => "synthesized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub asset_id: String,
    pub reason: MatchReason,
}

/// Candidate assets for one data record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMapping {
    pub data_record_id: String,
    /// Priority-ordered candidates without duplicates
    pub candidates: Vec<MatchCandidate>,
    /// Proposed asset when nothing matched; also the sole candidate then
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesized: Option<Asset>,
    /// Several assets matched, or one of them is Critical/High
    pub high_confidence: bool,
    pub reasoning: String,
}

impl DiscoveryMapping {
    /// Candidate asset ids in priority order.
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.asset_id.as_str())
    }
}

/// Outcome of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    /// Newly proposed assets, not yet persisted
    pub discovered_assets: Vec<Asset>,
    /// Mappings keyed by data record id, in input order
    pub mappings: IndexMap<String, DiscoveryMapping>,
    pub confidence: ConfidenceTier,
    pub reasoning: Vec<String>,
}

impl DiscoveryResult {
    #[must_use]
    pub fn mapping(&self, record_id: &str) -> Option<&DiscoveryMapping> {
        self.mappings.get(record_id)
    }

    /// Plain `record id -> asset ids` view of the mappings.
    #[must_use]
    pub fn suggested_mappings(&self) -> IndexMap<String, Vec<String>> {
        self.mappings
            .iter()
            .map(|(id, m)| (id.clone(), m.asset_ids().map(str::to_string).collect()))
            .collect()
    }
}

/// Links data records to existing assets, or proposes new ones.
#[derive(Debug, Clone, Default)]
pub struct AssetDiscoveryMatcher {
    config: DiscoveryConfig,
}

impl AssetDiscoveryMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_config(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Map every data record to candidate assets.
    ///
    /// Deterministic: the same inputs always give the same mappings,
    /// synthesized asset ids and confidence.
    #[must_use]
    pub fn discover(&self, records: &[DataRecord], existing: &[Asset]) -> DiscoveryResult {
        let mut result = DiscoveryResult::default();

        for record in records {
            let candidates = self.candidates_for(record, existing);

            let mapping = if candidates.is_empty() {
                let asset = synthesize_asset(record);
                let reasoning = format!(
                    "No existing assets found for \"{}\". Suggested new asset: {}",
                    record.name, asset.name
                );
                tracing::debug!("{reasoning}");
                DiscoveryMapping {
                    data_record_id: record.id.clone(),
                    candidates: vec![MatchCandidate {
                        asset_id: asset.id.clone(),
                        reason: MatchReason::Synthesized,
                    }],
                    high_confidence: is_strong_match(&[&asset]),
                    synthesized: Some(asset),
                    reasoning,
                }
            } else {
                let matched: Vec<&Asset> = candidates
                    .iter()
                    .filter_map(|c| existing.iter().find(|a| a.id == c.asset_id))
                    .collect();
                let reasoning = format!(
                    "Data item \"{}\" mapped to {} asset(s) based on location, owner, and type matching",
                    record.name,
                    candidates.len()
                );
                DiscoveryMapping {
                    data_record_id: record.id.clone(),
                    high_confidence: is_strong_match(&matched),
                    candidates,
                    synthesized: None,
                    reasoning,
                }
            };

            result.reasoning.push(mapping.reasoning.clone());
            if let Some(ref asset) = mapping.synthesized {
                result.discovered_assets.push(asset.clone());
            }
            result.mappings.insert(record.id.clone(), mapping);
        }

        result.confidence = self.overall_confidence(&result);
        tracing::info!(
            "Discovery mapped {} data records, proposed {} new assets, confidence {}",
            result.mappings.len(),
            result.discovered_assets.len(),
            result.confidence
        );
        result
    }

    /// Priority-ordered, deduplicated candidates for one record.
    fn candidates_for(&self, record: &DataRecord, existing: &[Asset]) -> Vec<MatchCandidate> {
        let location_matches: Vec<&Asset> = existing
            .iter()
            .filter(|a| locations_overlap(&a.location, &record.location))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates = Vec::new();

        for asset in &location_matches {
            if owners_match(&asset.owner, &record.owner) && seen.insert(asset.id.as_str()) {
                candidates.push(MatchCandidate {
                    asset_id: asset.id.clone(),
                    reason: MatchReason::LocationAndOwner,
                });
            }
        }

        for asset in &location_matches {
            if seen.insert(asset.id.as_str()) {
                candidates.push(MatchCandidate {
                    asset_id: asset.id.clone(),
                    reason: MatchReason::Location,
                });
            }
        }

        for asset in existing
            .iter()
            .filter(|a| self.config.match_categories.contains(&a.category))
        {
            if candidates.len() >= self.config.max_candidates {
                break;
            }
            if seen.insert(asset.id.as_str()) {
                candidates.push(MatchCandidate {
                    asset_id: asset.id.clone(),
                    reason: MatchReason::Category,
                });
            }
        }

        candidates
    }

    fn overall_confidence(&self, result: &DiscoveryResult) -> ConfidenceTier {
        let total = result.mappings.len();
        if total == 0 {
            return ConfidenceTier::Low;
        }
        let strong = result.mappings.values().filter(|m| m.high_confidence).count();
        let ratio = strong as f64 / total as f64;
        ConfidenceTier::from_ratios(ratio, self.config.high_ratio, ratio, self.config.medium_ratio)
    }
}

/// Case-insensitive equality or containment in either direction.
///
/// Empty locations never match.
fn locations_overlap(asset_location: &str, record_location: &str) -> bool {
    let a = asset_location.trim().to_lowercase();
    let r = record_location.trim().to_lowercase();
    if a.is_empty() || r.is_empty() {
        return false;
    }
    a == r || a.contains(&r) || r.contains(&a)
}

fn owners_match(asset_owner: &str, record_owner: &str) -> bool {
    let a = asset_owner.trim().to_lowercase();
    !a.is_empty() && a == record_owner.trim().to_lowercase()
}

fn is_strong_match(assets: &[&Asset]) -> bool {
    assets.len() > 1 || assets.iter().any(|a| a.criticality.is_elevated())
}

/// Propose an asset for a record nothing matched.
fn synthesize_asset(record: &DataRecord) -> Asset {
    let location = record.location.to_lowercase();
    let category = if location.contains("file") || location.contains("storage") {
        AssetCategory::Filesystem
    } else if location.contains("app") || location.contains("service") {
        AssetCategory::Application
    } else {
        AssetCategory::Database
    };

    let mut asset = Asset::new(
        format!("asset-discovered-{}", record.id),
        format!("Supporting Asset for {}", record.name),
        category,
        record.classification.implied_criticality(),
    )
    .with_owner(record.owner.clone())
    .with_location(record.location.clone())
    .with_related_record(record.id.clone());
    asset.description = format!("Auto-discovered asset supporting data item: {}", record.name);
    asset.data_classification = Some(record.classification);
    if !record.data_type.trim().is_empty() {
        asset.data_types.push(record.data_type.clone());
    }
    asset
}
