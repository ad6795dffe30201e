//! Enrich command handler.
//!
//! Implements the `enrich` subcommand: load the inventory, run one or both
//! enrichment directions, and print the result.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

use super::inventory::load_items;
use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::enrichment::{EnrichmentDirection, EnrichmentOrchestrator, EnrichmentRunResult};
use crate::model::{Asset, DataRecord};

/// Inputs of the `enrich` subcommand
#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    /// JSON array of assets
    pub assets: Option<PathBuf>,
    /// JSON array of data records
    pub records: Option<PathBuf>,
    /// Direction to run; both when unset
    pub direction: Option<EnrichmentDirection>,
    pub output_file: Option<PathBuf>,
    pub quiet: bool,
}

/// Run the enrich command. Returns whether every run succeeded.
pub async fn run_enrich(options: EnrichOptions, config: &AppConfig) -> Result<bool> {
    let assets: Vec<Asset> = match options.assets {
        Some(ref path) => load_items(path, "asset")?,
        None => Vec::new(),
    };
    let records: Vec<DataRecord> = match options.records {
        Some(ref path) => load_items(path, "data record")?,
        None => Vec::new(),
    };

    let orchestrator =
        EnrichmentOrchestrator::from_config(config).context("failed to set up enrichment")?;
    let target = OutputTarget::from_option(options.output_file);

    let (content, success) = match options.direction {
        Some(direction) => {
            let result = orchestrator.run(direction, &records, &assets).await;
            let content = render(&result, &config.output, summarize_run)?;
            (content, result.success)
        }
        None => {
            let result = orchestrator.run_bidirectional(&records, &assets).await;
            let content = render(&result, &config.output, |r| {
                format!(
                    "{}\n{}",
                    summarize_run(&r.data_to_assets),
                    summarize_run(&r.assets_to_data)
                )
            })?;
            (content, result.success())
        }
    };

    write_output(&content, &target, options.quiet)?;
    Ok(success)
}

/// Human-readable summary of one run.
#[must_use]
pub fn summarize_run(result: &EnrichmentRunResult) -> String {
    let mut out = String::new();
    let status = if result.success { "ok" } else { "failed" };
    let _ = writeln!(out, "Enrichment {} [{status}]", result.direction);

    if let Some(ref discovery) = result.discovery {
        let _ = writeln!(
            out,
            "  Discovery: {} data records mapped, {} new assets proposed, confidence {}",
            discovery.mappings.len(),
            discovery.discovered_assets.len(),
            discovery.confidence
        );
    }
    if let Some(ref classification) = result.classification {
        let _ = writeln!(
            out,
            "  Classification: {} classified, {} unclassified, confidence {}",
            classification.items_classified,
            classification.items_unclassified,
            classification.overall_confidence
        );
    }
    if result.sbom_results.is_some() {
        let counts = result.sbom_status_counts();
        if counts.is_empty() {
            let _ = writeln!(out, "  SBOM: no software assets");
        } else {
            let parts: Vec<String> = counts
                .iter()
                .map(|(status, count)| format!("{status} {count}"))
                .collect();
            let _ = writeln!(out, "  SBOM: {}", parts.join(", "));
        }
    }
    for warning in &result.warnings {
        let _ = writeln!(out, "  warning: {warning}");
    }
    for error in &result.errors {
        let _ = writeln!(out, "  error: {error}");
    }
    out.trim_end().to_string()
}
