//! Payload shape detection.
//!
//! Detection is first-match-wins in a fixed precedence: a top-level
//! `components` list, then a `packages` list, then a nested
//! `bom.components` list. A payload carrying several of these is always
//! read as the first one, even if that list is empty.

use serde_json::Value;

/// Recognized SBOM payload shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SbomShape {
    /// CycloneDX-like `components` list
    Components,
    /// SPDX-like `packages` list
    Packages,
    /// Generic wrapper: `{"bom": {"components": [...]}}`
    NestedBom,
}

impl SbomShape {
    /// Detection precedence
    pub const PRECEDENCE: [Self; 3] = [Self::Components, Self::Packages, Self::NestedBom];

    /// Get the human-readable name for this shape.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Components => "components",
            Self::Packages => "packages",
            Self::NestedBom => "bom.components",
        }
    }

    /// Whether the payload carries this shape's list.
    #[must_use]
    pub fn matches(&self, raw: &Value) -> bool {
        match self {
            Self::Components => raw.get("components").is_some_and(Value::is_array),
            Self::Packages => raw.get("packages").is_some_and(Value::is_array),
            Self::NestedBom => raw
                .get("bom")
                .and_then(|bom| bom.get("components"))
                .is_some_and(Value::is_array),
        }
    }

    /// Detect the shape of a payload, or `None` when unrecognized.
    #[must_use]
    pub fn detect(raw: &Value) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|shape| shape.matches(raw))
    }
}

impl std::fmt::Display for SbomShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detects_each_shape() {
        assert_eq!(
            SbomShape::detect(&json!({"components": []})),
            Some(SbomShape::Components)
        );
        assert_eq!(
            SbomShape::detect(&json!({"packages": [{"name": "x"}]})),
            Some(SbomShape::Packages)
        );
        assert_eq!(
            SbomShape::detect(&json!({"bom": {"components": []}})),
            Some(SbomShape::NestedBom)
        );
    }

    #[test]
    fn test_precedence_is_first_match_wins() {
        let both = json!({
            "components": [],
            "packages": [{"name": "ignored"}],
            "bom": {"components": [{"name": "ignored"}]}
        });
        assert_eq!(SbomShape::detect(&both), Some(SbomShape::Components));

        let spdx_and_bom = json!({
            "packages": [],
            "bom": {"components": [{"name": "ignored"}]}
        });
        assert_eq!(SbomShape::detect(&spdx_and_bom), Some(SbomShape::Packages));
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert_eq!(SbomShape::detect(&Value::Null), None);
        assert_eq!(SbomShape::detect(&json!([1, 2, 3])), None);
        assert_eq!(SbomShape::detect(&json!({"components": "nope"})), None);
        assert_eq!(SbomShape::detect(&json!({"bom": []})), None);
    }
}
