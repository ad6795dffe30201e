//! Software-asset detection heuristics.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{Asset, AssetCategory, ConfidenceTier};

/// Tag fragments that mark an asset as software
const SOFTWARE_TAGS: &[&str] = &[
    "software",
    "app",
    "application",
    "component",
    "library",
    "framework",
    "sbom",
    "dependency",
];

/// Keywords that reveal a package ecosystem, checked in order
const ECOSYSTEM_KEYWORDS: &[(&str, &[&str])] = &[
    ("npm", &["npm", "node", "package.json"]),
    ("pypi", &["pypi", "python", "pip"]),
    ("maven", &["maven", "java", "gradle"]),
    ("nuget", &["nuget", ".net", "c#"]),
    ("docker", &["docker", "container"]),
];

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // hyphenated package names: react-dom
        r"(?i)^[a-z]+-[a-z]+",
        // scoped packages: @angular/core
        r"(?i)^@[a-z]+/[a-z-]+",
        // source or binary file names
        r"(?i)\.(js|ts|py|jar|dll)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v|@)?(\d+\.\d+\.\d+(?:-\w+)?)").expect("static regex")
});

/// Kind of software an asset appears to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareType {
    Application,
    Library,
    Framework,
    Container,
    Unknown,
}

impl fmt::Display for SoftwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Application => "application",
            Self::Library => "library",
            Self::Framework => "framework",
            Self::Container => "container",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// What detection concluded about one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareDetection {
    pub confidence: ConfidenceTier,
    pub detected_type: SoftwareType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl SoftwareDetection {
    const fn unknown() -> Self {
        Self {
            confidence: ConfidenceTier::Low,
            detected_type: SoftwareType::Unknown,
            ecosystem: None,
            name: None,
            version: None,
        }
    }

    /// Whether the asset should take part in SBOM resolution.
    #[must_use]
    pub fn is_software(&self) -> bool {
        self.detected_type != SoftwareType::Unknown
    }
}

/// Decide whether an asset is software and what kind.
///
/// An explicit software or application category (or the software flag) is
/// high confidence. Software-like tags or package-like names are medium. A
/// bare service is low. Anything else is unknown.
#[must_use]
pub fn detect_software(asset: &Asset) -> SoftwareDetection {
    let name = asset.name.to_lowercase();
    let tags: Vec<String> = asset.tags.iter().map(|t| t.to_lowercase()).collect();

    let explicit = match asset.category {
        AssetCategory::Application => Some(SoftwareType::Application),
        AssetCategory::Software => Some(SoftwareType::Library),
        _ if asset.is_software => Some(SoftwareType::Library),
        _ => None,
    };
    if let Some(detected_type) = explicit {
        return SoftwareDetection {
            confidence: ConfidenceTier::High,
            detected_type,
            ecosystem: detect_ecosystem(&name, &tags),
            name: Some(asset.name.clone()),
            version: extract_version(&name),
        };
    }

    let has_software_tag = tags
        .iter()
        .any(|tag| SOFTWARE_TAGS.iter().any(|st| tag.contains(st)));
    let matches_pattern = NAME_PATTERNS.iter().any(|re| re.is_match(&name));

    if has_software_tag || matches_pattern {
        return SoftwareDetection {
            confidence: ConfidenceTier::Medium,
            detected_type: infer_software_type(&name, &tags),
            ecosystem: detect_ecosystem(&name, &tags),
            name: Some(asset.name.clone()),
            version: extract_version(&name),
        };
    }

    if asset.category == AssetCategory::Service {
        return SoftwareDetection {
            confidence: ConfidenceTier::Low,
            detected_type: SoftwareType::Application,
            ecosystem: None,
            name: Some(asset.name.clone()),
            version: None,
        };
    }

    SoftwareDetection::unknown()
}

fn combined_text(name: &str, tags: &[String]) -> String {
    format!("{name} {}", tags.join(" ")).to_lowercase()
}

/// Infer a package ecosystem from the name and tags.
#[must_use]
pub fn detect_ecosystem(name: &str, tags: &[String]) -> Option<String> {
    let text = combined_text(name, tags);
    ECOSYSTEM_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(ecosystem, _)| (*ecosystem).to_string())
}

/// Pull a `major.minor.patch[-suffix]` version out of a name.
#[must_use]
pub fn extract_version(name: &str) -> Option<String> {
    VERSION
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn infer_software_type(name: &str, tags: &[String]) -> SoftwareType {
    let text = combined_text(name, tags);
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["framework", "react", "angular", "vue"]) {
        SoftwareType::Framework
    } else if has(&["docker", "container", "image"]) {
        SoftwareType::Container
    } else if has(&["library", "lib", "package"]) {
        SoftwareType::Library
    } else {
        SoftwareType::Application
    }
}
