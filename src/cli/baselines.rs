//! Baselines command handler.
//!
//! Lists and searches the configured baseline SBOM catalog.

use anyhow::{bail, Context, Result};
use std::fmt::Write as _;

use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::model::BaselineSbom;
use crate::sbom::{source_from_config, BaselineCatalog};

/// Filters of the `baselines` subcommand
#[derive(Debug, Clone, Default)]
pub struct BaselineQuery {
    pub ecosystem: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive text matched against name and description
    pub search: Option<String>,
}

/// Run the baselines command
pub async fn run_baselines(
    query: &BaselineQuery,
    config: &AppConfig,
    target: &OutputTarget,
    quiet: bool,
) -> Result<()> {
    let Some(source) = source_from_config(&config.baselines)? else {
        bail!("no baseline source configured; set baselines.directory or baselines.index_url");
    };
    let catalog = BaselineCatalog::from_boxed(source);
    catalog
        .try_load_index()
        .await
        .context("failed to load baseline index")?;

    let mut baselines = match (&query.search, &query.ecosystem, &query.category) {
        (Some(text), _, _) => catalog.search(text).await,
        (None, Some(ecosystem), _) => catalog.by_ecosystem(ecosystem).await,
        (None, None, Some(category)) => catalog.by_category(category).await,
        (None, None, None) => catalog.all_baselines().await,
    };
    // Remaining filters narrow the first one
    if let Some(ref ecosystem) = query.ecosystem {
        baselines.retain(|b| {
            b.effective_ecosystem()
                .is_some_and(|e| e.eq_ignore_ascii_case(ecosystem))
        });
    }
    if let Some(ref category) = query.category {
        baselines.retain(|b| {
            b.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        });
    }

    let output = render(&baselines, &config.output, |b| summarize_baselines(b))?;
    write_output(&output, target, quiet)
}

#[must_use]
pub fn summarize_baselines(baselines: &[BaselineSbom]) -> String {
    if baselines.is_empty() {
        return "No baseline SBOMs found".to_string();
    }
    let mut out = String::new();
    for b in baselines {
        let ecosystem = b.effective_ecosystem().unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<24} {:<12} {:<8} {:<10} {}",
            b.name,
            b.version,
            ecosystem,
            b.format.to_string(),
            b.path
        );
    }
    let _ = write!(out, "{} baseline SBOMs", baselines.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[tokio::test]
    async fn test_run_baselines_filters() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("index.json"),
            r#"{"baselineSBOMs": [
                {"id": "react", "name": "react", "version": "18.2.0", "ecosystem": "npm",
                 "category": "framework", "path": "npm/react.json"},
                {"id": "flask", "name": "flask", "version": "3.0.0", "ecosystem": "pypi",
                 "category": "framework", "path": "pypi/flask.json"}
            ]}"#,
        )
        .unwrap();
        let out = tmp.path().join("out.txt");
        let config = AppConfig::builder()
            .baseline_directory(tmp.path())
            .output_format(OutputFormat::Summary)
            .build();

        let query = BaselineQuery {
            category: Some("framework".to_string()),
            ecosystem: Some("pypi".to_string()),
            search: None,
        };
        run_baselines(&query, &config, &OutputTarget::File(out.clone()), true)
            .await
            .unwrap();

        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.contains("flask"));
        assert!(!text.contains("react"));
        assert!(text.ends_with("1 baseline SBOMs"));
    }

    #[tokio::test]
    async fn test_run_baselines_requires_source() {
        let err = run_baselines(
            &BaselineQuery::default(),
            &AppConfig::default(),
            &OutputTarget::Stdout,
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no baseline source configured"));
    }
}
