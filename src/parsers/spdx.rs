//! SPDX-like `packages` payloads.
//!
//! Besides a package's own `dependencies` list, `DEPENDS_ON` and
//! `DEPENDENCY_OF` entries in the document's `relationships` list are folded
//! into the dependency references, with SPDX identifiers translated to
//! component keys.

use super::detection::SbomShape;
use super::traits::{lenient_list, non_empty, ShapeParser};
use crate::model::SbomComponent;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// License values SPDX uses to mean "no information"
const NO_LICENSE: [&str; 2] = ["NOASSERTION", "NONE"];

/// Parser for the `packages` shape
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxShapeParser;

impl SpdxShapeParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShapeParser for SpdxShapeParser {
    fn shape(&self) -> SbomShape {
        SbomShape::Packages
    }

    fn parse_value(&self, raw: &Value) -> Vec<SbomComponent> {
        let Some(items) = raw.get("packages").and_then(Value::as_array) else {
            return Vec::new();
        };

        let parsed: Vec<(Option<String>, SbomComponent)> = items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match SpdxPackage::deserialize(item) {
                Ok(pkg) => Some(pkg.into_component()),
                Err(e) => {
                    tracing::debug!("Skipping unreadable package #{idx}: {e}");
                    None
                }
            })
            .collect();

        // SPDXID -> component key
        let id_keys: HashMap<String, String> = parsed
            .iter()
            .filter_map(|(spdx_id, comp)| {
                spdx_id
                    .as_ref()
                    .map(|id| (id.clone(), comp.key().to_string()))
            })
            .collect();
        let resolve = |r: &str| -> String { id_keys.get(r).cloned().unwrap_or_else(|| r.to_string()) };

        let mut components: Vec<SbomComponent> = parsed
            .into_iter()
            .map(|(_, mut comp)| {
                comp.dependencies = comp.dependencies.iter().map(|r| resolve(r)).collect();
                comp
            })
            .collect();

        if let Some(relationships) = raw.get("relationships").and_then(Value::as_array) {
            for rel in relationships {
                let Ok(rel) = SpdxRelationship::deserialize(rel) else {
                    continue;
                };
                let (from, to) = match rel.relationship_type.as_str() {
                    "DEPENDS_ON" => (&rel.element, &rel.related),
                    "DEPENDENCY_OF" => (&rel.related, &rel.element),
                    _ => continue,
                };
                let from_key = resolve(from);
                if let Some(owner) = components.iter_mut().find(|c| c.key() == from_key) {
                    owner.add_dependency(resolve(to));
                }
            }
        }

        components
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    name: Option<String>,
    #[serde(rename = "SPDXID", alias = "spdxId")]
    spdx_id: Option<String>,
    version_info: Option<String>,
    primary_package_purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    external_refs: Vec<ExternalRef>,
    #[serde(default, deserialize_with = "lenient_list")]
    dependencies: Vec<String>,
    license_declared: Option<String>,
}

impl SpdxPackage {
    fn into_component(self) -> (Option<String>, SbomComponent) {
        let spdx_id = non_empty(self.spdx_id.as_deref()).map(str::to_string);
        let name = non_empty(self.name.as_deref())
            .map(str::to_string)
            .or_else(|| spdx_id.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let purl = self
            .external_refs
            .iter()
            .find(|r| r.reference_type.eq_ignore_ascii_case("purl"))
            .and_then(|r| non_empty(Some(r.reference_locator.as_str())))
            .map(str::to_string);
        let licenses = non_empty(self.license_declared.as_deref())
            .filter(|l| !NO_LICENSE.contains(l))
            .map(|l| vec![l.to_string()])
            .unwrap_or_default();

        let mut component = SbomComponent {
            name,
            version: non_empty(self.version_info.as_deref()).map(str::to_string),
            purl,
            component_type: self.primary_package_purpose,
            dependencies: Vec::new(),
            licenses,
        };
        for dep in self.dependencies {
            if let Some(dep) = non_empty(Some(dep.as_str())) {
                component.add_dependency(dep);
            }
        }
        (spdx_id, component)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExternalRef {
    #[serde(default)]
    reference_type: String,
    #[serde(default)]
    reference_locator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    #[serde(rename = "spdxElementId")]
    element: String,
    relationship_type: String,
    #[serde(rename = "relatedSpdxElement")]
    related: String,
}
