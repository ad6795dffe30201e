//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod baselines;
mod enrich;
mod inventory;
mod output;
mod rules;
mod tree;

pub use baselines::{run_baselines, summarize_baselines, BaselineQuery};
pub use enrich::{run_enrich, summarize_run, EnrichOptions};
pub use inventory::load_items;
pub use output::{render, to_json, write_output, OutputTarget};
pub use rules::{run_rules, summarize_rules};
pub use tree::{render_forest, run_tree};
