//! Rules command handler.

use anyhow::{Context, Result};
use std::fmt::Write as _;

use super::output::{render, write_output, OutputTarget};
use crate::classification::{ClassificationEngine, RuleSet};
use crate::config::AppConfig;

/// Print the active classification rule set, highest priority first.
pub fn run_rules(config: &AppConfig, target: &OutputTarget, quiet: bool) -> Result<()> {
    let engine = ClassificationEngine::from_config(&config.classification)
        .context("failed to load classification rules")?;
    let output = render(engine.rules(), &config.output, summarize_rules)?;
    write_output(&output, target, quiet)
}

#[must_use]
pub fn summarize_rules(rules: &RuleSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>8}  {:<16} {:<14} NAME", "PRIORITY", "ID", "LEVEL");
    for rule in rules.rules() {
        let _ = writeln!(
            out,
            "{:>8}  {:<16} {:<14} {}",
            rule.priority,
            rule.id,
            rule.classification.to_string(),
            rule.name
        );
    }
    out.trim_end().to_string()
}
