//! Classification rule engine.
//!
//! For each data record the engine gathers its related assets (linked from
//! either side), evaluates every rule against every related asset and keeps
//! the highest level any firing rule suggests. Priority only orders the
//! evaluation, and with it the order in which reasoning is captured.

use indexmap::IndexMap;
use serde::Serialize;

use super::rules::{ClassificationRule, RuleSet};
use crate::config::ClassificationConfig;
use crate::error::Result;
use crate::model::{Asset, ClassificationLevel, ConfidenceTier, DataRecord};

/// A rule that raised a record's suggested level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub id: String,
    pub name: String,
    pub priority: u32,
    pub classification: ClassificationLevel,
}

impl From<&ClassificationRule> for AppliedRule {
    fn from(rule: &ClassificationRule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            priority: rule.priority,
            classification: rule.classification,
        }
    }
}

/// Suggested classification for one data record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationSuggestion {
    pub data_record_id: String,
    pub suggested_classification: ClassificationLevel,
    pub confidence: ConfidenceTier,
    /// Human-readable audit trail, in capture order
    pub reasoning: Vec<String>,
    /// Related asset ids the suggestion was derived from
    pub based_on_assets: Vec<String>,
    /// Rules that raised the level, without duplicates
    pub rules_applied: Vec<AppliedRule>,
}

impl ClassificationSuggestion {
    /// Return a copy of `record` carrying the suggested classification.
    #[must_use]
    pub fn apply_to(&self, record: &DataRecord) -> DataRecord {
        let mut updated = record.clone();
        updated.classification = self.suggested_classification;
        updated.updated_at = chrono::Utc::now();
        updated
    }
}

/// Outcome of one classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Suggestions keyed by data record id, in input order
    pub classifications: IndexMap<String, ClassificationSuggestion>,
    pub overall_confidence: ConfidenceTier,
    pub items_classified: usize,
    /// Records with no related asset
    pub items_unclassified: usize,
    /// Number of rules in the evaluated set
    pub rules_evaluated: usize,
}

impl ClassificationResult {
    #[must_use]
    pub fn get(&self, record_id: &str) -> Option<&ClassificationSuggestion> {
        self.classifications.get(record_id)
    }

    /// Number of suggestions at each confidence tier: (high, medium, low).
    #[must_use]
    pub fn confidence_counts(&self) -> (usize, usize, usize) {
        self.classifications
            .values()
            .fold((0, 0, 0), |(h, m, l), s| match s.confidence {
                ConfidenceTier::High => (h + 1, m, l),
                ConfidenceTier::Medium => (h, m + 1, l),
                ConfidenceTier::Low => (h, m, l + 1),
            })
    }
}

/// Evaluates a [`RuleSet`] against inventory data.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    rules: RuleSet,
    high_priority_threshold: u32,
    high_ratio: f64,
    medium_ratio: f64,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl ClassificationEngine {
    /// Engine with the given rules and default thresholds.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self::with_config(rules, &ClassificationConfig::default())
    }

    /// Engine with the given rules and configured thresholds.
    #[must_use]
    pub fn with_config(rules: RuleSet, config: &ClassificationConfig) -> Self {
        Self {
            rules,
            high_priority_threshold: config.high_priority_threshold,
            high_ratio: config.high_ratio,
            medium_ratio: config.medium_ratio,
        }
    }

    /// Build the rule set a config describes and wrap it in an engine.
    ///
    /// Rules from `rules_file` are merged on top of the built-in ones when
    /// `include_default_rules` is set, and replace them otherwise.
    pub fn from_config(config: &ClassificationConfig) -> Result<Self> {
        let base = if config.include_default_rules {
            RuleSet::default()
        } else {
            RuleSet::empty()
        };
        let rules = match config.rules_file {
            Some(ref path) => base.merged(&RuleSet::from_yaml_file(path)?),
            None => base,
        };
        Ok(Self::with_config(rules, config))
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Suggest a classification for every data record with related assets.
    #[must_use]
    pub fn classify(&self, assets: &[Asset], records: &[DataRecord]) -> ClassificationResult {
        let mut result = ClassificationResult {
            rules_evaluated: self.rules.len(),
            ..ClassificationResult::default()
        };

        for record in records {
            let related: Vec<&Asset> = assets.iter().filter(|a| a.is_related_to(record)).collect();
            if related.is_empty() {
                tracing::debug!("Data record '{}' has no related assets", record.id);
                result.items_unclassified += 1;
                continue;
            }

            let suggestion = self.classify_record(record, &related);
            result
                .classifications
                .insert(record.id.clone(), suggestion);
            result.items_classified += 1;
        }

        result.overall_confidence = self.overall_confidence(&result);
        tracing::info!(
            "Classified {} data records ({} unclassified), overall confidence {}",
            result.items_classified,
            result.items_unclassified,
            result.overall_confidence
        );
        result
    }

    fn classify_record(&self, record: &DataRecord, related: &[&Asset]) -> ClassificationSuggestion {
        let mut suggested = ClassificationLevel::Internal;
        let mut reasoning = Vec::new();
        let mut rules_applied: Vec<AppliedRule> = Vec::new();
        let mut based_on_assets = Vec::with_capacity(related.len());

        for asset in related {
            based_on_assets.push(asset.id.clone());

            for rule in self.rules.rules() {
                if !rule.fires_for(asset) || !rule.classification.is_higher_than(&suggested) {
                    continue;
                }
                suggested = rule.classification;
                reasoning.push(format!(
                    "Rule \"{}\": {} (applied to asset \"{}\")",
                    rule.name, rule.description, asset.name
                ));
                if !rules_applied.iter().any(|r| r.id == rule.id) {
                    rules_applied.push(AppliedRule::from(rule));
                }
            }
        }

        let confidence = self.record_confidence(related.len(), &rules_applied);
        ClassificationSuggestion {
            data_record_id: record.id.clone(),
            suggested_classification: suggested,
            confidence,
            reasoning,
            based_on_assets,
            rules_applied,
        }
    }

    fn record_confidence(&self, asset_count: usize, applied: &[AppliedRule]) -> ConfidenceTier {
        if asset_count == 0 || applied.is_empty() {
            return ConfidenceTier::Low;
        }
        let high_priority = applied
            .iter()
            .any(|r| r.priority >= self.high_priority_threshold);
        match (asset_count >= 2, high_priority) {
            (true, true) => ConfidenceTier::High,
            (_, true) | (true, false) => ConfidenceTier::Medium,
            (false, false) => ConfidenceTier::Low,
        }
    }

    fn overall_confidence(&self, result: &ClassificationResult) -> ConfidenceTier {
        let total = result.classifications.len();
        if total == 0 {
            return ConfidenceTier::Low;
        }
        let (high, medium, _) = result.confidence_counts();
        let high_ratio = high as f64 / total as f64;
        let medium_ratio = medium as f64 / total as f64;
        ConfidenceTier::from_ratios(
            high_ratio,
            self.high_ratio,
            high_ratio + medium_ratio,
            self.medium_ratio,
        )
    }
}
