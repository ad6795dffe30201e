//! Data classification from asset characteristics.
//!
//! A [`ClassificationEngine`] evaluates a priority-ordered [`RuleSet`] against
//! the assets related to each data record and suggests a sensitivity level.
//! Rules are data ([`RuleCondition`]), so additional ones can be loaded from
//! YAML without code changes.
//!
//! # Example
//!
//! ```
//! use inventory_enrich::classification::ClassificationEngine;
//! use inventory_enrich::model::{
//!     Asset, AssetCategory, ClassificationLevel, ConfidenceTier, Criticality, DataRecord,
//! };
//!
//! let assets = vec![
//!     Asset::new("a1", "Billing", AssetCategory::Application, Criticality::Critical)
//!         .with_related_record("d1"),
//! ];
//! let records = vec![DataRecord::new("d1", "Invoices")];
//!
//! let result = ClassificationEngine::default().classify(&assets, &records);
//! let suggestion = result.get("d1").unwrap();
//! assert_eq!(suggestion.suggested_classification, ClassificationLevel::Restricted);
//! assert_eq!(suggestion.confidence, ConfidenceTier::Medium);
//! ```

mod engine;
mod rules;

pub use engine::{AppliedRule, ClassificationEngine, ClassificationResult, ClassificationSuggestion};
pub use rules::{default_rules, ClassificationRule, RuleCondition, RuleFile, RuleSet};
