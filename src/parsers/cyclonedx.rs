//! CycloneDX-like `components` payloads, including the nested `bom` wrapper.
//!
//! Dependency references may appear inline on a component (as plain strings
//! or `{"ref": ...}` objects) or in a top-level `dependencies` list of
//! `{"ref", "dependsOn"}` entries. Both are folded into each component's
//! reference list, with `bom-ref` values translated to component keys.

use super::detection::SbomShape;
use super::traits::{lenient_list, non_empty, ShapeParser};
use crate::model::SbomComponent;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Parser for the `components` and `bom.components` shapes
#[derive(Debug, Clone, Copy)]
pub struct CycloneDxShapeParser {
    nested: bool,
}

impl CycloneDxShapeParser {
    /// Parser for a top-level `components` list
    #[must_use]
    pub const fn new() -> Self {
        Self { nested: false }
    }

    /// Parser for the `{"bom": {"components": [...]}}` wrapper
    #[must_use]
    pub const fn nested() -> Self {
        Self { nested: true }
    }

    fn document<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        if self.nested {
            raw.get("bom")
        } else {
            Some(raw)
        }
    }
}

impl Default for CycloneDxShapeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeParser for CycloneDxShapeParser {
    fn shape(&self) -> SbomShape {
        if self.nested {
            SbomShape::NestedBom
        } else {
            SbomShape::Components
        }
    }

    fn parse_value(&self, raw: &Value) -> Vec<SbomComponent> {
        let Some(doc) = self.document(raw) else {
            return Vec::new();
        };
        let Some(items) = doc.get("components").and_then(Value::as_array) else {
            return Vec::new();
        };

        let parsed: Vec<(Option<String>, SbomComponent)> = items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match CdxComponent::deserialize(item) {
                Ok(cdx) => Some(cdx.into_component()),
                Err(e) => {
                    tracing::debug!("Skipping unreadable component #{idx}: {e}");
                    None
                }
            })
            .collect();

        // bom-ref -> component key
        let ref_keys: HashMap<String, String> = parsed
            .iter()
            .filter_map(|(bom_ref, comp)| {
                bom_ref
                    .as_ref()
                    .map(|r| (r.clone(), comp.key().to_string()))
            })
            .collect();

        let mut components: Vec<SbomComponent> = parsed
            .into_iter()
            .map(|(_, mut comp)| {
                comp.dependencies = comp
                    .dependencies
                    .iter()
                    .map(|r| ref_keys.get(r).cloned().unwrap_or_else(|| r.clone()))
                    .collect();
                comp
            })
            .collect();

        if let Some(edges) = doc.get("dependencies").and_then(Value::as_array) {
            fold_dependency_list(&mut components, edges, &ref_keys);
        }

        components
    }
}

/// Fold a top-level `[{"ref": ..., "dependsOn": [...]}]` list into components.
fn fold_dependency_list(
    components: &mut [SbomComponent],
    edges: &[Value],
    ref_keys: &HashMap<String, String>,
) {
    let resolve = |r: &str| -> String { ref_keys.get(r).cloned().unwrap_or_else(|| r.to_string()) };

    for edge in edges {
        let Ok(edge) = CdxDependency::deserialize(edge) else {
            continue;
        };
        let owner_key = resolve(&edge.reference);
        let Some(owner) = components.iter_mut().find(|c| c.key() == owner_key) else {
            continue;
        };
        for target in &edge.depends_on {
            owner.add_dependency(resolve(target));
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent {
    name: Option<String>,
    version: Option<String>,
    purl: Option<String>,
    #[serde(rename = "type")]
    component_type: Option<String>,
    #[serde(rename = "bom-ref", alias = "bomRef")]
    bom_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    dependencies: Vec<DependencyRef>,
    #[serde(default, deserialize_with = "lenient_list")]
    licenses: Vec<LicenseEntry>,
}

impl CdxComponent {
    fn into_component(self) -> (Option<String>, SbomComponent) {
        let purl = non_empty(self.purl.as_deref()).map(str::to_string);
        let name = non_empty(self.name.as_deref())
            .map(str::to_string)
            .or_else(|| purl.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let mut component = SbomComponent {
            name,
            version: non_empty(self.version.as_deref()).map(str::to_string),
            purl,
            component_type: self.component_type,
            dependencies: Vec::new(),
            licenses: self
                .licenses
                .into_iter()
                .filter_map(LicenseEntry::into_identifier)
                .collect(),
        };
        for dep in self.dependencies {
            if let Some(reference) = dep.into_reference() {
                component.add_dependency(reference);
            }
        }
        (non_empty(self.bom_ref.as_deref()).map(str::to_string), component)
    }
}

/// Inline dependency entry: a bare reference or an object with `ref`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DependencyRef {
    Plain(String),
    Object {
        #[serde(rename = "ref")]
        reference: String,
    },
    Other(Value),
}

impl DependencyRef {
    fn into_reference(self) -> Option<String> {
        match self {
            Self::Plain(r) | Self::Object { reference: r } => {
                non_empty(Some(r.as_str())).map(str::to_string)
            }
            Self::Other(v) => {
                tracing::debug!("Ignoring dependency entry without a reference: {v}");
                None
            }
        }
    }
}

/// License entry: `{"license": {"id"|"name"}}`, `{"expression"}` or a bare string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LicenseEntry {
    Plain(String),
    Choice {
        license: Option<LicenseChoice>,
        expression: Option<String>,
    },
    /// Anything else is read and discarded
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct LicenseChoice {
    id: Option<String>,
    name: Option<String>,
}

impl LicenseEntry {
    fn into_identifier(self) -> Option<String> {
        match self {
            Self::Plain(s) => non_empty(Some(s.as_str())).map(str::to_string),
            Self::Choice {
                license,
                expression,
            } => license
                .and_then(|l| {
                    non_empty(l.id.as_deref())
                        .or_else(|| non_empty(l.name.as_deref()))
                        .map(str::to_string)
                })
                .or_else(|| non_empty(expression.as_deref()).map(str::to_string)),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxDependency {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, deserialize_with = "lenient_list")]
    depends_on: Vec<String>,
}
