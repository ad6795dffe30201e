//! Dependency graph construction.
//!
//! Turns a normalized component list into a forest of
//! [`DependencyTreeNode`](crate::model::DependencyTreeNode) trees. Building
//! always terminates, even when the input declares dependency cycles.
//!
//! # Example
//!
//! ```
//! use inventory_enrich::graph::DependencyGraphBuilder;
//! use inventory_enrich::model::SbomComponent;
//!
//! let components = vec![
//!     SbomComponent::new("a").depends_on("b"),
//!     SbomComponent::new("b").depends_on("a"),
//! ];
//! let forest = DependencyGraphBuilder::new().build(&components);
//! assert_eq!(forest.roots[0].children[0].component.name, "b");
//! assert!(forest.roots[0].children[0].children.is_empty());
//! ```

mod builder;

pub use crate::config::GraphConfig;
pub use builder::{build_forest, DependencyForest, DependencyGraphBuilder, ForestStats};
