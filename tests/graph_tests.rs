//! Dependency forest construction over fixtures and arbitrary graphs.

use std::collections::HashSet;

use inventory_enrich::config::{GraphConfig, DEFAULT_MAX_TREE_NODES};
use inventory_enrich::model::{DependencyTreeNode, SbomComponent};
use inventory_enrich::{normalize, normalize_str, DependencyGraphBuilder};
use proptest::prelude::*;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn load(name: &str) -> Vec<SbomComponent> {
    let content = std::fs::read_to_string(format!("{FIXTURES_DIR}/sboms/{name}")).unwrap();
    normalize_str(&content)
}

fn levels_consistent(node: &DependencyTreeNode, expected: usize) -> bool {
    node.level == expected
        && node
            .children
            .iter()
            .all(|c| levels_consistent(c, expected + 1))
}

#[test]
fn test_cyclic_fixture() {
    let components = load("cyclic.cdx.json");
    assert_eq!(components.len(), 4);

    let forest = DependencyGraphBuilder::new().build(&components);
    assert_eq!(forest.len(), 1);
    let stats = &forest.stats;
    assert_eq!(stats.nodes, 4);
    assert_eq!(stats.truncated_cycles, 1);
    assert_eq!(stats.unresolved_references, 1);
    assert_eq!(stats.max_depth, 2);

    let app = forest.root("app").unwrap();
    let children: Vec<&str> = app.children.iter().map(DependencyTreeNode::key).collect();
    assert_eq!(children, vec!["web", "db-driver"]);
    // http -> web is dropped, web is already on the path
    assert!(app.children[0].children[0].children.is_empty());
}

#[test]
fn test_nested_fixture_keys_by_purl() {
    let components = load("nested.json");
    let forest = DependencyGraphBuilder::new().build(&components);

    assert_eq!(forest.len(), 1);
    let gateway = forest.root("pkg:docker/gateway@1.2.0").unwrap();
    assert_eq!(gateway.children.len(), 1);
    assert_eq!(gateway.children[0].component.name, "express");
    assert_eq!(forest.stats.unresolved_references, 0);
}

#[test]
fn test_depth_limit() {
    let components = load("cyclic.cdx.json");
    let config = GraphConfig {
        max_depth: 1,
        ..GraphConfig::default()
    };
    let forest = DependencyGraphBuilder::with_config(config).build(&components);

    assert_eq!(forest.stats.max_depth, 1);
    assert!(forest.stats.depth_limited > 0);
    // Components cut off below the limit become roots of their own
    assert!(forest.root("http").is_some());
}

#[test]
fn test_long_chain_builds_without_recursion() {
    let n = 10_000;
    let components: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let deps: Vec<String> = if i + 1 < n { vec![format!("c{}", i + 1)] } else { Vec::new() };
            serde_json::json!({"name": format!("c{i}"), "dependencies": deps})
        })
        .collect();
    let components = normalize(&serde_json::json!({ "components": components }));
    assert_eq!(components.len(), n);

    let forest = DependencyGraphBuilder::new().build(&components);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest.stats.nodes, n);
    assert_eq!(forest.stats.max_depth, n - 1);
    assert_eq!(forest.roots[0].node_count(), n);
    assert_eq!(forest.nodes().last().map(DependencyTreeNode::key), Some("c9999"));
}

/// `layers` layers of two components, each depending on both components
/// of the next layer; full expansion has 2^(layers+1) - 2 nodes.
fn layered_diamonds(layers: usize) -> Vec<SbomComponent> {
    (0..layers)
        .flat_map(|layer| {
            ["a", "b"].into_iter().map(move |side| {
                let comp = SbomComponent::new(format!("{side}{layer}"));
                if layer + 1 < layers {
                    comp.depends_on(format!("a{}", layer + 1))
                        .depends_on(format!("b{}", layer + 1))
                } else {
                    comp
                }
            })
        })
        .collect()
}

#[test]
fn test_node_budget_caps_diamond_expansion() {
    let components = layered_diamonds(30);
    let config = GraphConfig {
        max_nodes: 5_000,
        ..GraphConfig::default()
    };
    let forest = DependencyGraphBuilder::with_config(config).build(&components);

    let stats = &forest.stats;
    // Roots are always placed, so the budget may be exceeded by the root count
    assert!(stats.nodes <= 5_000 + stats.roots, "nodes: {}", stats.nodes);
    assert_eq!(forest.nodes().count(), stats.nodes);
    assert!(stats.node_limited > 0);
    assert_eq!(stats.truncated_cycles, 0);

    // The default budget applies too
    let forest = DependencyGraphBuilder::new().build(&components);
    assert!(forest.stats.nodes <= DEFAULT_MAX_TREE_NODES + forest.stats.roots);
    assert!(forest.stats.node_limited > 0);
}

#[test]
fn test_small_diamonds_fit_the_budget() {
    let forest = DependencyGraphBuilder::new().build(&layered_diamonds(4));
    // a0 expands fully (2 + 4 + 8 below it), b0 is its own root
    assert_eq!(forest.len(), 2);
    assert_eq!(forest.stats.nodes, 15 + 15);
    assert_eq!(forest.stats.node_limited, 0);
}

/// Small graphs where every component may depend on any other, itself included.
fn arbitrary_graph() -> impl Strategy<Value = Vec<SbomComponent>> {
    (1usize..7).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 0..4), n).prop_map(move |edges| {
            edges
                .into_iter()
                .enumerate()
                .map(|(i, deps)| {
                    deps.into_iter().fold(SbomComponent::new(format!("c{i}")), |c, d| {
                        c.depends_on(format!("c{d}"))
                    })
                })
                .collect()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn forest_is_acyclic(components in arbitrary_graph()) {
        let forest = DependencyGraphBuilder::new().build(&components);
        for root in &forest.roots {
            prop_assert!(!root.has_ancestor_cycle());
            prop_assert!(levels_consistent(root, 0));
        }
    }

    #[test]
    fn forest_covers_every_component(components in arbitrary_graph()) {
        let forest = DependencyGraphBuilder::new().build(&components);
        let reached: HashSet<&str> = forest.nodes().map(DependencyTreeNode::key).collect();
        for component in &components {
            prop_assert!(reached.contains(component.key()));
        }
        prop_assert_eq!(forest.stats.unresolved_references, 0);
    }

    #[test]
    fn depth_limit_is_respected(components in arbitrary_graph(), limit in 1usize..4) {
        let config = GraphConfig { max_depth: limit, ..GraphConfig::default() };
        let forest = DependencyGraphBuilder::with_config(config).build(&components);
        prop_assert!(forest.stats.max_depth <= limit);
    }
}
