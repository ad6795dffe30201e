//! Classification rules as data.
//!
//! A rule pairs a [`RuleCondition`] predicate over an asset with a target
//! classification level and a priority. Conditions are a tagged enum
//! evaluated by [`RuleCondition::matches`], so rule files are plain YAML:
//!
//! ```yaml
//! rules:
//!   - id: payments-db
//!     name: Payment databases
//!     description: Databases holding card data are Restricted
//!     classification: Restricted
//!     priority: 9
//!     condition:
//!       type: all
//!       conditions:
//!         - { type: category, category: database }
//!         - { type: data_type, data_type: Financial }
//! ```

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, Result};
use crate::model::{Asset, AssetCategory, ClassificationLevel, Criticality};

/// Side-effect-free predicate over an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Asset criticality equals `level`
    Criticality { level: Criticality },
    /// Asset carries the data-type tag (case-insensitive)
    DataType { data_type: String },
    /// Asset category equals `category`
    Category { category: AssetCategory },
    /// Asset is flagged as software
    IsSoftware,
    /// Always fires
    Always,
    /// Every sub-condition fires
    All { conditions: Vec<RuleCondition> },
    /// At least one sub-condition fires
    Any { conditions: Vec<RuleCondition> },
    /// The sub-condition does not fire
    Not { condition: Box<RuleCondition> },
    /// Condition kind this version does not know; never fires
    #[serde(other)]
    Unknown,
}

impl RuleCondition {
    /// Evaluate against an asset.
    #[must_use]
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            Self::Criticality { level } => asset.criticality == *level,
            Self::DataType { data_type } => asset.has_data_type(data_type),
            Self::Category { category } => asset.category == *category,
            Self::IsSoftware => asset.is_software,
            Self::Always => true,
            Self::All { conditions } => conditions.iter().all(|c| c.matches(asset)),
            Self::Any { conditions } => conditions.iter().any(|c| c.matches(asset)),
            Self::Not { condition } => !condition.matches(asset),
            Self::Unknown => false,
        }
    }

    /// Whether this condition (or any nested one) is unrecognized.
    #[must_use]
    pub fn has_unknown(&self) -> bool {
        match self {
            Self::Unknown => true,
            Self::All { conditions } | Self::Any { conditions } => {
                conditions.iter().any(Self::has_unknown)
            }
            Self::Not { condition } => condition.has_unknown(),
            _ => false,
        }
    }
}

/// A prioritized classification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: RuleCondition,
    /// Level suggested when the condition fires
    pub classification: ClassificationLevel,
    /// Higher runs first
    pub priority: u32,
}

impl ClassificationRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: RuleCondition,
        classification: ClassificationLevel,
        priority: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            condition,
            classification,
            priority,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn fires_for(&self, asset: &Asset) -> bool {
        self.condition.matches(asset)
    }
}

/// On-disk shape of a rule file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
}

/// An immutable, priority-ordered set of rules.
///
/// Rules are kept sorted by priority, highest first; rules of equal priority
/// keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleSet {
    /// Create a rule set, sorting by priority.
    #[must_use]
    pub fn new(mut rules: Vec<ClassificationRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// A rule set with no rules.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Return a new set with `rule` added.
    #[must_use]
    pub fn with_rule(&self, rule: ClassificationRule) -> Self {
        let mut rules = self.rules.clone();
        rules.push(rule);
        Self::new(rules)
    }

    /// Return a new set with all of `other`'s rules added after this set's.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut rules = self.rules.clone();
        rules.extend(other.rules.iter().cloned());
        Self::new(rules)
    }

    /// Parse a YAML rule file.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: RuleFile = serde_yaml::from_str(content).context("parsing rule file")?;
        for rule in &file.rules {
            if rule.condition.has_unknown() {
                tracing::warn!(
                    "Rule '{}' uses an unrecognized condition and will never fire",
                    rule.id
                );
            }
        }
        Ok(Self::new(file.rules))
    }

    /// Load a YAML rule file from disk.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::EnrichError::io(path, e))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("loading rules from {}", path.display()))
    }
}

/// The built-in rule set.
#[must_use]
pub fn default_rules() -> Vec<ClassificationRule> {
    use ClassificationLevel::{Confidential, Internal, Restricted};

    vec![
        ClassificationRule::new(
            "rule-1",
            "Critical Asset Classification",
            RuleCondition::Criticality {
                level: Criticality::Critical,
            },
            Restricted,
            10,
        )
        .with_description("Data on critical assets is classified as Restricted or higher"),
        ClassificationRule::new(
            "rule-2",
            "High Criticality Asset",
            RuleCondition::Criticality {
                level: Criticality::High,
            },
            Confidential,
            9,
        )
        .with_description("Data on high criticality assets is classified as Confidential or higher"),
        ClassificationRule::new(
            "rule-3",
            "PII Data Classification",
            RuleCondition::DataType {
                data_type: "PII".to_string(),
            },
            Confidential,
            8,
        )
        .with_description("PII data is classified as Confidential or higher"),
        ClassificationRule::new(
            "rule-4",
            "PHI Data Classification",
            RuleCondition::DataType {
                data_type: "PHI".to_string(),
            },
            Restricted,
            9,
        )
        .with_description("PHI data is classified as Restricted"),
        ClassificationRule::new(
            "rule-5",
            "Financial Data Classification",
            RuleCondition::DataType {
                data_type: "Financial".to_string(),
            },
            Confidential,
            8,
        )
        .with_description("Financial data is classified as Confidential"),
        ClassificationRule::new(
            "rule-6",
            "Database Asset Classification",
            RuleCondition::Category {
                category: AssetCategory::Database,
            },
            Confidential,
            6,
        )
        .with_description("Data in databases is typically Confidential"),
        ClassificationRule::new(
            "rule-7",
            "Default Internal Classification",
            RuleCondition::Always,
            Internal,
            1,
        )
        .with_description("Default classification for unclassified data"),
    ]
}
