//! SBOM component normalization.
//!
//! Heterogeneous SBOM payloads are reduced to one component shape
//! ([`SbomComponent`]). Three payload shapes are recognized, tried in a fixed
//! order (see [`SbomShape`]):
//!
//! - a CycloneDX-like `components` list
//! - an SPDX-like `packages` list
//! - a generic `{"bom": {"components": [...]}}` wrapper
//!
//! Normalization never fails. An unrecognized shape, or a document that is
//! not JSON at all, yields an empty list.
//!
//! ## Usage
//!
//! ```
//! use inventory_enrich::parsers::normalize;
//! use serde_json::json;
//!
//! let components = normalize(&json!({
//!     "components": [{"name": "a", "dependencies": ["b"]}, {"name": "b"}]
//! }));
//! assert_eq!(components.len(), 2);
//! assert_eq!(components[0].dependencies, vec!["b"]);
//! ```

mod cyclonedx;
mod detection;
mod spdx;
mod traits;

pub use cyclonedx::CycloneDxShapeParser;
pub use detection::SbomShape;
pub use spdx::SpdxShapeParser;
pub use traits::ShapeParser;

use crate::model::SbomComponent;
use serde_json::Value;

/// Normalizes raw SBOM payloads into [`SbomComponent`] lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentNormalizer {
    components: CycloneDxShapeParser,
    packages: SpdxShapeParser,
    nested: NestedParser,
}

/// Wrapper so the nested parser has its own `Default`.
#[derive(Debug, Clone, Copy)]
struct NestedParser(CycloneDxShapeParser);

impl Default for NestedParser {
    fn default() -> Self {
        Self(CycloneDxShapeParser::nested())
    }
}

impl ComponentNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn parser_for(&self, shape: SbomShape) -> &dyn ShapeParser {
        match shape {
            SbomShape::Components => &self.components,
            SbomShape::Packages => &self.packages,
            SbomShape::NestedBom => &self.nested.0,
        }
    }

    /// Normalize an already-parsed payload.
    #[must_use]
    pub fn normalize(&self, raw: &Value) -> Vec<SbomComponent> {
        let Some(shape) = SbomShape::detect(raw) else {
            tracing::debug!("Unrecognized SBOM shape; no components extracted");
            return Vec::new();
        };
        let parser = self.parser_for(shape);
        let components = parser.parse_value(raw);
        tracing::debug!(
            "Normalized {} components from '{}' shape",
            components.len(),
            parser.shape_name()
        );
        components
    }

    /// Normalize JSON text; text that is not JSON yields no components.
    #[must_use]
    pub fn normalize_str(&self, content: &str) -> Vec<SbomComponent> {
        match serde_json::from_str::<Value>(content) {
            Ok(raw) => self.normalize(&raw),
            Err(e) => {
                tracing::warn!("SBOM payload is not valid JSON: {e}");
                Vec::new()
            }
        }
    }
}

/// Normalize a payload with the default normalizer.
#[must_use]
pub fn normalize(raw: &Value) -> Vec<SbomComponent> {
    ComponentNormalizer::new().normalize(raw)
}

/// Normalize JSON text with the default normalizer.
#[must_use]
pub fn normalize_str(content: &str) -> Vec<SbomComponent> {
    ComponentNormalizer::new().normalize_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_components_shape_wins_over_nested() {
        let raw = json!({
            "components": [{"name": "top"}],
            "bom": {"components": [{"name": "nested"}]}
        });
        let comps = normalize(&raw);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].name, "top");
    }

    #[test]
    fn test_empty_components_list_still_wins() {
        let raw = json!({"components": [], "packages": [{"name": "p"}]});
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn test_unrecognized_input_is_empty() {
        assert!(normalize(&json!({"foo": "bar"})).is_empty());
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize_str("not json at all").is_empty());
    }

    #[test]
    fn test_equivalent_shapes_agree() {
        let cdx = normalize(&json!({"components": [
            {"name": "a", "version": "1.0.0"},
            {"name": "b", "version": "2.0.0"}
        ]}));
        let spdx = normalize(&json!({"packages": [
            {"name": "a", "versionInfo": "1.0.0"},
            {"name": "b", "versionInfo": "2.0.0"}
        ]}));
        let pairs = |c: &[SbomComponent]| {
            c.iter()
                .map(|x| (x.name.clone(), x.version.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(&cdx), pairs(&spdx));
    }
}
