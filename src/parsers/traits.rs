//! Shape parser trait.
//!
//! Each recognized payload shape has one parser. Parsers never fail: a
//! payload that does not carry their shape, or entries they cannot read,
//! simply contribute no components.

use super::detection::SbomShape;
use crate::model::SbomComponent;
use serde::Deserialize;
use serde_json::Value;

/// Trait for shape-specific component parsers
pub trait ShapeParser {
    /// The shape this parser handles
    fn shape(&self) -> SbomShape;

    /// Extract normalized components from a raw payload.
    ///
    /// Called only after detection picked this parser's shape, but
    /// implementations must still tolerate anything.
    fn parse_value(&self, raw: &Value) -> Vec<SbomComponent>;

    /// Human-readable name, used in log output
    fn shape_name(&self) -> &'static str {
        self.shape().name()
    }
}

/// Read a non-empty string field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Deserialize a list leniently: `null` or a non-list becomes empty, and
/// unreadable elements are dropped.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
