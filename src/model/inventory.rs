//! Inventory records: assets, data records and the enumerations they share.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a tracked asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    #[serde(alias = "Server")]
    Server,
    #[serde(alias = "Database")]
    Database,
    #[serde(alias = "Application")]
    Application,
    #[serde(alias = "Network")]
    Network,
    #[serde(alias = "File System", alias = "file-system", alias = "Filesystem")]
    Filesystem,
    #[serde(alias = "Software")]
    Software,
    #[serde(alias = "Service")]
    Service,
}

impl AssetCategory {
    /// Get the human-readable name for this category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Database => "Database",
            Self::Application => "Application",
            Self::Network => "Network",
            Self::Filesystem => "File System",
            Self::Software => "Software",
            Self::Service => "Service",
        }
    }

    /// Parse a category from loosely formatted text.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "server" => Some(Self::Server),
            "database" | "db" => Some(Self::Database),
            "application" | "app" => Some(Self::Application),
            "network" => Some(Self::Network),
            "filesystem" | "storage" => Some(Self::Filesystem),
            "software" => Some(Self::Software),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Business criticality of an asset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Criticality {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
    #[serde(alias = "critical")]
    Critical,
}

impl Criticality {
    /// Critical and High assets count as strong evidence.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Data sensitivity tier.
///
/// The derived ordering is the total order used for classification:
/// `Public < Internal < Confidential < Restricted < TopSecret`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum ClassificationLevel {
    #[serde(alias = "public")]
    Public,
    #[default]
    #[serde(alias = "internal")]
    Internal,
    #[serde(alias = "confidential")]
    Confidential,
    #[serde(alias = "restricted")]
    Restricted,
    #[serde(rename = "Top Secret", alias = "top-secret", alias = "TopSecret")]
    TopSecret,
}

impl ClassificationLevel {
    /// All levels, lowest first.
    pub const ALL: [Self; 5] = [
        Self::Public,
        Self::Internal,
        Self::Confidential,
        Self::Restricted,
        Self::TopSecret,
    ];

    /// Numeric rank on the fixed total order (Public = 1).
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Public => 1,
            Self::Internal => 2,
            Self::Confidential => 3,
            Self::Restricted => 4,
            Self::TopSecret => 5,
        }
    }

    /// Strictly higher on the fixed order; equal ranks never override.
    #[must_use]
    pub const fn is_higher_than(&self, other: &Self) -> bool {
        self.rank() > other.rank()
    }

    /// Criticality a freshly synthesized asset gets for data of this level.
    #[must_use]
    pub const fn implied_criticality(&self) -> Criticality {
        match self {
            Self::Restricted | Self::TopSecret => Criticality::Critical,
            Self::Confidential => Criticality::High,
            Self::Public | Self::Internal => Criticality::Medium,
        }
    }
}

impl fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "Public"),
            Self::Internal => write!(f, "Internal"),
            Self::Confidential => write!(f, "Confidential"),
            Self::Restricted => write!(f, "Restricted"),
            Self::TopSecret => write!(f, "Top Secret"),
        }
    }
}

/// Coarse label for how much evidence backed an inference.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    #[default]
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Map evidence ratios onto a tier.
    ///
    /// `high_ratio` is compared against `high_threshold` first, then
    /// `medium_ratio` against `medium_threshold`.
    #[must_use]
    pub fn from_ratios(
        high_ratio: f64,
        high_threshold: f64,
        medium_ratio: f64,
        medium_threshold: f64,
    ) -> Self {
        if high_ratio >= high_threshold {
            Self::High
        } else if medium_ratio >= medium_threshold {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A tracked system, resource, service or software unit.
///
/// The surrounding application owns persistence; the core only reads these
/// values and returns new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(alias = "type")]
    pub category: AssetCategory,
    pub criticality: Criticality,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_classification: Option<ClassificationLevel>,
    /// Data-type tags such as `PII`, `PHI` or `Financial`
    #[serde(default)]
    pub data_types: Vec<String>,
    /// Free-form tags; used by software detection
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_software: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbom_data: Option<serde_json::Value>,
    #[serde(default, alias = "relatedDataItems")]
    pub related_data_records: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Create an asset with the required fields; everything else is empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: AssetCategory,
        criticality: Criticality,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            category,
            criticality,
            owner: String::new(),
            location: String::new(),
            description: String::new(),
            data_classification: None,
            data_types: Vec::new(),
            tags: Vec::new(),
            is_software: false,
            sbom_available: None,
            sbom_data: None,
            related_data_records: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style owner setter
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Builder-style location setter
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder-style data type tag
    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_types.push(data_type.into());
        self
    }

    /// Builder-style tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Link this asset to a data record.
    #[must_use]
    pub fn with_related_record(mut self, record_id: impl Into<String>) -> Self {
        self.related_data_records.push(record_id.into());
        self
    }

    /// Mark this asset as software.
    #[must_use]
    pub const fn as_software(mut self) -> Self {
        self.is_software = true;
        self
    }

    /// Whether the asset already carries SBOM data.
    #[must_use]
    pub fn has_sbom(&self) -> bool {
        self.sbom_available.unwrap_or(false) || self.sbom_data.is_some()
    }

    /// Whether the asset carries the given data-type tag (case-insensitive).
    #[must_use]
    pub fn has_data_type(&self, data_type: &str) -> bool {
        self.data_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(data_type))
    }

    /// Whether this asset and the record reference each other in either direction.
    #[must_use]
    pub fn is_related_to(&self, record: &DataRecord) -> bool {
        self.related_data_records.iter().any(|id| id == &record.id)
            || record.supporting_assets.iter().any(|id| id == &self.id)
    }

    /// Identity check used to skip malformed ingested rows.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}

/// A tracked category of organizational data, distinct from the assets hosting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRecord {
    pub id: String,
    pub name: String,
    /// Data-type category, e.g. `PII`
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub classification: ClassificationLevel,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<String>,
    #[serde(default)]
    pub supporting_assets: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl DataRecord {
    /// Create a data record with the required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            data_type: String::new(),
            classification: ClassificationLevel::default(),
            location: String::new(),
            owner: String::new(),
            description: None,
            retention_period: None,
            supporting_assets: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style location setter
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder-style owner setter
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Builder-style classification setter
    #[must_use]
    pub const fn with_classification(mut self, level: ClassificationLevel) -> Self {
        self.classification = level;
        self
    }

    /// Builder-style data type setter
    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Link this record to a supporting asset.
    #[must_use]
    pub fn with_supporting_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.supporting_assets.push(asset_id.into());
        self
    }

    /// Identity check used to skip malformed ingested rows.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_total_order() {
        use ClassificationLevel::*;
        assert!(Public < Internal);
        assert!(Internal < Confidential);
        assert!(Confidential < Restricted);
        assert!(Restricted < TopSecret);
        assert!(Restricted.is_higher_than(&Confidential));
        assert!(!Confidential.is_higher_than(&Confidential));
    }

    #[test]
    fn test_implied_criticality() {
        assert_eq!(
            ClassificationLevel::TopSecret.implied_criticality(),
            Criticality::Critical
        );
        assert_eq!(
            ClassificationLevel::Confidential.implied_criticality(),
            Criticality::High
        );
        assert_eq!(
            ClassificationLevel::Public.implied_criticality(),
            Criticality::Medium
        );
    }

    #[test]
    fn test_asset_deserializes_partial_host_rows() {
        let json = r#"{
            "id": "a-1",
            "name": "Billing DB",
            "type": "Database",
            "criticality": "Critical",
            "relatedDataItems": ["d-1"],
            "dataClassification": "Top Secret"
        }"#;
        let asset: Asset = serde_json::from_str(json).expect("valid asset");
        assert_eq!(asset.category, AssetCategory::Database);
        assert_eq!(asset.related_data_records, vec!["d-1".to_string()]);
        assert_eq!(
            asset.data_classification,
            Some(ClassificationLevel::TopSecret)
        );
        assert!(!asset.has_sbom());
    }

    #[test]
    fn test_file_system_alias() {
        let cat: AssetCategory = serde_json::from_str("\"File System\"").unwrap();
        assert_eq!(cat, AssetCategory::Filesystem);
        assert_eq!(AssetCategory::from_name("file-system"), Some(cat));
    }

    #[test]
    fn test_relation_either_direction() {
        let record = DataRecord::new("d-1", "Customers").with_supporting_asset("a-2");
        let forward = Asset::new("a-1", "DB", AssetCategory::Database, Criticality::Low)
            .with_related_record("d-1");
        let backward = Asset::new("a-2", "App", AssetCategory::Application, Criticality::Low);
        let unrelated = Asset::new("a-3", "Net", AssetCategory::Network, Criticality::Low);

        assert!(forward.is_related_to(&record));
        assert!(backward.is_related_to(&record));
        assert!(!unrelated.is_related_to(&record));
    }

    #[test]
    fn test_confidence_from_ratios() {
        assert_eq!(
            ConfidenceTier::from_ratios(0.6, 0.6, 0.0, 0.7),
            ConfidenceTier::High
        );
        assert_eq!(
            ConfidenceTier::from_ratios(0.2, 0.6, 0.7, 0.7),
            ConfidenceTier::Medium
        );
        assert_eq!(
            ConfidenceTier::from_ratios(0.2, 0.6, 0.5, 0.7),
            ConfidenceTier::Low
        );
        assert!(ConfidenceTier::High > ConfidenceTier::Medium);
    }
}
