//! Baseline SBOM reference data.
//!
//! A baseline index lists pre-supplied reference SBOMs that can be stamped
//! onto matching software assets. Besides the `baselineSBOMs` list, the index
//! may carry side tables (business applications, dependency mappings and a
//! usage heat map) which are exposed through the catalog queries.

use chrono::Utc;
use indexmap::IndexMap;
use packageurl::PackageUrl;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Format tag of a baseline document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaselineFormat {
    #[default]
    #[serde(rename = "CycloneDX", alias = "cyclonedx")]
    CycloneDx,
    #[serde(rename = "SPDX", alias = "spdx")]
    Spdx,
    #[serde(rename = "SWID", alias = "swid")]
    Swid,
}

impl fmt::Display for BaselineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycloneDx => write!(f, "CycloneDX"),
            Self::Spdx => write!(f, "SPDX"),
            Self::Swid => write!(f, "SWID"),
        }
    }
}

/// One reference SBOM entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSbom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Storage path of the payload, relative to the index location
    pub path: String,
    #[serde(default)]
    pub format: BaselineFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl BaselineSbom {
    /// Create an entry with the required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ecosystem: None,
            category: None,
            path: path.into(),
            format: BaselineFormat::default(),
            description: None,
            purl: None,
            license: None,
        }
    }

    /// Builder-style ecosystem setter
    #[must_use]
    pub fn with_ecosystem(mut self, ecosystem: impl Into<String>) -> Self {
        self.ecosystem = Some(ecosystem.into());
        self
    }

    /// Builder-style category setter
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder-style purl setter
    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    /// Effective ecosystem: the declared one, else the purl type.
    #[must_use]
    pub fn effective_ecosystem(&self) -> Option<String> {
        if let Some(eco) = self.ecosystem.as_deref().filter(|e| !e.is_empty()) {
            return Some(eco.to_lowercase());
        }
        self.purl
            .as_deref()
            .and_then(|p| PackageUrl::from_str(p).ok())
            .map(|p| p.ty().to_lowercase())
    }
}

/// How a business application uses a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDependency {
    pub component_id: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub criticality: String,
    #[serde(default)]
    pub usage: String,
}

/// Adoption figures of a business application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_share: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_adoption: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users: Option<u64>,
    #[serde(default)]
    pub heat_map_score: f64,
}

/// A catalogued commercial or open-source business application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessApplication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub industry: Vec<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub deployment: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub usage: UsageMetrics,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<ComponentDependency>,
    #[serde(default)]
    pub sbom_components: Vec<String>,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub format: String,
}

impl BusinessApplication {
    /// Case-insensitive match on name, description, vendor or functions.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
            || self.vendor.to_lowercase().contains(&q)
            || self.functions.iter().any(|f| f.to_lowercase().contains(&q))
    }
}

/// One application using a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsage {
    pub app_id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub criticality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMapping {
    #[serde(default)]
    pub used_by: Vec<ComponentUsage>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub heat_map_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMapping {
    #[serde(default)]
    pub direct_dependencies: Vec<String>,
    #[serde(default)]
    pub transitive_dependencies: Vec<String>,
    #[serde(default)]
    pub dependency_depth: u32,
    #[serde(default)]
    pub total_components: u32,
}

/// Component and application dependency side tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMappings {
    #[serde(default, deserialize_with = "lenient_map")]
    pub by_component: IndexMap<String, ComponentMapping>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub by_application: IndexMap<String, ApplicationMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHeat {
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(default)]
    pub total_usage: u64,
}

/// Usage heat map keyed by category, function and industry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageHeatMap {
    #[serde(default, deserialize_with = "lenient_map")]
    pub by_category: IndexMap<String, CategoryHeat>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub by_function: IndexMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub by_industry: IndexMap<String, f64>,
}

/// Component ranking entry returned by usage queries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsageRank {
    pub component_id: String,
    pub usage_count: u64,
    pub heat_map_score: f64,
}

/// The full baseline index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineIndex {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        rename = "baselineSBOMs",
        alias = "baselineSboms",
        deserialize_with = "lenient_list"
    )]
    pub baseline_sboms: Vec<BaselineSbom>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub business_applications: Vec<BusinessApplication>,
    #[serde(default, deserialize_with = "lenient_table")]
    pub dependency_mappings: DependencyMappings,
    #[serde(default, deserialize_with = "lenient_table")]
    pub usage_heat_map: UsageHeatMap,
    /// Category key to display label
    #[serde(default, deserialize_with = "lenient_map")]
    pub categories: IndexMap<String, String>,
    /// Ecosystem key to display label
    #[serde(default, deserialize_with = "lenient_map")]
    pub ecosystems: IndexMap<String, String>,
}

impl BaselineIndex {
    /// An index with no entries, used whenever the real one is unavailable.
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            version: "1.0.0".to_string(),
            last_updated: Utc::now().to_rfc3339(),
            description: description.into(),
            baseline_sboms: Vec::new(),
            business_applications: Vec::new(),
            dependency_mappings: DependencyMappings::default(),
            usage_heat_map: UsageHeatMap::default(),
            categories: IndexMap::new(),
            ecosystems: IndexMap::new(),
        }
    }

    /// Build an index around a plain list of baselines.
    #[must_use]
    pub fn from_baselines(baselines: Vec<BaselineSbom>) -> Self {
        Self {
            baseline_sboms: baselines,
            ..Self::empty("In-memory baseline index")
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.baseline_sboms.is_empty()
    }
}

// ============================================================================
// Lenient side tables
// ============================================================================
//
// One malformed entry is skipped with a warning instead of failing the whole
// index. The side tables are decoration for catalog queries and must never
// take the `baselineSBOMs` list down with them.

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!("Ignoring baseline index list: expected an array, got {other}");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping malformed baseline index entry #{i}: {e}");
                None
            }
        })
        .collect())
}

fn lenient_map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(IndexMap::new()),
        other => {
            tracing::warn!("Ignoring baseline index table: expected an object, got {other}");
            return Ok(IndexMap::new());
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                tracing::warn!("Skipping malformed baseline index entry '{key}': {e}");
                None
            }
        })
        .collect())
}

fn lenient_table<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed baseline index table: {e}");
        T::default()
    }))
}
