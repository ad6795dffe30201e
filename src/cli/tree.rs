//! Tree command handler.
//!
//! Implements the `tree` subcommand: normalize an SBOM file and print its
//! dependency forest.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::graph::{DependencyForest, DependencyGraphBuilder};
use crate::model::DependencyTreeNode;
use crate::parsers::normalize_str;

/// Run the tree command
pub fn run_tree(
    sbom_path: &Path,
    config: &AppConfig,
    target: &OutputTarget,
    quiet: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(sbom_path)
        .with_context(|| format!("failed to read {}", sbom_path.display()))?;

    let components = normalize_str(&content);
    if components.is_empty() {
        tracing::warn!(
            "No components recognized in {}; expected a components, packages or bom.components list",
            sbom_path.display()
        );
    }

    let forest = DependencyGraphBuilder::with_config(config.graph.clone()).build(&components);
    let output = render(&forest, &config.output, render_forest)?;
    write_output(&output, target, quiet)
}

/// Draw the forest as an indented tree followed by its statistics.
#[must_use]
pub fn render_forest(forest: &DependencyForest) -> String {
    let mut out = String::new();
    for root in &forest.roots {
        let _ = writeln!(out, "{}", label(root));
        render_children(root, &mut out);
    }

    let stats = &forest.stats;
    let _ = write!(
        out,
        "\n{} roots, {} nodes, depth {}, {} unresolved references, {} cycles truncated",
        stats.roots,
        stats.nodes,
        stats.max_depth,
        stats.unresolved_references,
        stats.truncated_cycles
    );
    out
}

fn render_children(root: &DependencyTreeNode, out: &mut String) {
    // (node, prefix for its own line, prefix for its children)
    let mut stack: Vec<(&DependencyTreeNode, String, String)> = Vec::new();
    push_children(root, "", &mut stack);
    while let Some((node, line_prefix, child_prefix)) = stack.pop() {
        let _ = writeln!(out, "{line_prefix}{}", label(node));
        push_children(node, &child_prefix, &mut stack);
    }
}

fn push_children<'a>(
    node: &'a DependencyTreeNode,
    prefix: &str,
    stack: &mut Vec<(&'a DependencyTreeNode, String, String)>,
) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate().rev() {
        let (branch, indent) = if i + 1 == count {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        stack.push((child, format!("{prefix}{branch}"), format!("{prefix}{indent}")));
    }
}

fn label(node: &DependencyTreeNode) -> String {
    match node.component.version {
        Some(ref version) => format!("{}@{version}", node.component.name),
        None => node.component.name.clone(),
    }
}
