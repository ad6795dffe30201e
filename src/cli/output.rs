//! Output target handling for the CLI.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{OutputConfig, OutputFormat};

/// Where command output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Serialize a value as JSON, pretty-printed when configured.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

/// Render a value either as JSON or through a summary function.
pub fn render<T, F>(value: &T, config: &OutputConfig, summary: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match config.format {
        OutputFormat::Json => to_json(value, config.pretty),
        OutputFormat::Summary => Ok(summary(value)),
    }
}

/// Write output content to the target
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Output written to {}", path.display());
            }
            Ok(())
        }
    }
}
