//! Loading asset and data record collections from JSON files.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Read a JSON array of inventory items.
///
/// Items that do not deserialize are skipped with a warning so one bad row
/// does not reject the whole file.
pub fn load_items<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {kind} file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let Value::Array(rows) = value else {
        bail!("{} must contain a JSON array of {kind}s", path.display());
    };

    let total = rows.len();
    let items: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping {kind} #{idx} in {}: {e}", path.display());
                None
            }
        })
        .collect();

    tracing::debug!("Loaded {}/{total} {kind}s from {}", items.len(), path.display());
    Ok(items)
}
