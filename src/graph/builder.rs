//! Dependency forest construction with cycle-safe traversal.
//!
//! Components are keyed by package-URL when present, else by name. A node's
//! children are its dependency references resolved against that key map.
//! The cycle guard is the current root-to-node path only, so a shared
//! dependency may appear under several branches (diamonds) but never as its
//! own ancestor. Because diamonds are re-expanded per branch, the total node
//! count is capped by `GraphConfig::max_nodes`.
//!
//! Traversal uses an explicit frame stack, so arbitrarily long dependency
//! chains never exhaust the thread stack.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::GraphConfig;
use crate::model::{DependencyTreeNode, SbomComponent};

/// Summary of a built forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestStats {
    /// Number of root trees
    pub roots: usize,
    /// Total nodes across all trees (shared dependencies count once per branch)
    pub nodes: usize,
    /// Deepest level reached
    pub max_depth: usize,
    /// Dependency references that match no component
    pub unresolved_references: usize,
    /// References dropped because they would revisit an ancestor
    pub truncated_cycles: usize,
    /// Branches cut short by the configured depth limit
    pub depth_limited: usize,
    /// Branches cut short because the node budget was spent
    pub node_limited: usize,
    /// Components whose key repeats an earlier component's key
    pub duplicate_keys: usize,
}

/// A dependency forest and its statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyForest {
    pub roots: Vec<DependencyTreeNode>,
    pub stats: ForestStats,
}

impl DependencyForest {
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterate over every node of every tree, depth-first.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyTreeNode> {
        self.roots.iter().flat_map(DependencyTreeNode::walk)
    }

    /// Find the root whose component has the given key.
    #[must_use]
    pub fn root(&self, key: &str) -> Option<&DependencyTreeNode> {
        self.roots.iter().find(|r| r.key() == key)
    }

    /// Consume the forest, keeping only the trees.
    #[must_use]
    pub fn into_roots(self) -> Vec<DependencyTreeNode> {
        self.roots
    }
}

/// Builds dependency forests from normalized components.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraphBuilder {
    config: GraphConfig,
}

impl DependencyGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_config(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the forest.
    ///
    /// Components are rooted in input order, skipping any whose key was
    /// already reached from an earlier root. Always terminates: every path
    /// holds distinct keys, so no path is longer than the component count,
    /// and once `max_nodes` nodes are placed no further children are added.
    /// Every component still appears at least as a root.
    #[must_use]
    pub fn build(&self, components: &[SbomComponent]) -> DependencyForest {
        let index = KeyIndex::new(components, self.config.resolve_by_name);
        let mut walk = Walk {
            components,
            index: &index,
            max_depth: self.config.max_depth,
            max_nodes: self.config.max_nodes,
            placed: 0,
            deepest: 0,
            reached: HashSet::new(),
            path: HashSet::new(),
            stats: ForestStats {
                duplicate_keys: index.duplicates,
                unresolved_references: index.count_unresolved(components),
                ..ForestStats::default()
            },
        };

        let mut roots = Vec::new();
        for (idx, component) in components.iter().enumerate() {
            // Duplicates resolve to the first component with the same key
            let Some(canonical) = index.by_key.get(component.key()).copied() else {
                continue;
            };
            if canonical != idx || walk.reached.contains(&canonical) {
                continue;
            }
            roots.push(walk.expand(canonical));
        }

        let mut stats = walk.stats;
        stats.roots = roots.len();
        stats.nodes = walk.placed;
        stats.max_depth = walk.deepest;

        if stats.node_limited > 0 {
            tracing::warn!(
                "Dependency forest hit the {} node budget; {} branches were cut",
                self.config.max_nodes,
                stats.node_limited
            );
        }
        tracing::debug!(
            "Built dependency forest: {} roots, {} nodes, {} cycles truncated",
            stats.roots,
            stats.nodes,
            stats.truncated_cycles
        );

        DependencyForest { roots, stats }
    }
}

/// Build a forest with the default settings and return only the trees.
#[must_use]
pub fn build_forest(components: &[SbomComponent]) -> Vec<DependencyTreeNode> {
    DependencyGraphBuilder::new().build(components).into_roots()
}

/// Key and name lookups over the component list
struct KeyIndex<'a> {
    by_key: HashMap<&'a str, usize>,
    /// name -> index, `None` when several components share the name
    by_name: HashMap<&'a str, Option<usize>>,
    resolve_by_name: bool,
    duplicates: usize,
}

impl<'a> KeyIndex<'a> {
    fn new(components: &'a [SbomComponent], resolve_by_name: bool) -> Self {
        let mut by_key = HashMap::with_capacity(components.len());
        let mut by_name: HashMap<&str, Option<usize>> = HashMap::new();
        let mut duplicates = 0;

        for (idx, comp) in components.iter().enumerate() {
            if by_key.contains_key(comp.key()) {
                duplicates += 1;
                continue;
            }
            by_key.insert(comp.key(), idx);
            by_name
                .entry(comp.name.as_str())
                .and_modify(|slot| *slot = None)
                .or_insert(Some(idx));
        }

        Self {
            by_key,
            by_name,
            resolve_by_name,
            duplicates,
        }
    }

    fn resolve(&self, reference: &str) -> Option<usize> {
        if let Some(&idx) = self.by_key.get(reference) {
            return Some(idx);
        }
        if self.resolve_by_name {
            return self.by_name.get(reference).copied().flatten();
        }
        None
    }

    fn count_unresolved(&self, components: &[SbomComponent]) -> usize {
        components
            .iter()
            .flat_map(|c| c.dependencies.iter())
            .filter(|r| self.resolve(r).is_none())
            .count()
    }
}

struct Walk<'a> {
    components: &'a [SbomComponent],
    index: &'a KeyIndex<'a>,
    max_depth: usize,
    max_nodes: usize,
    /// Nodes placed so far across all trees
    placed: usize,
    deepest: usize,
    /// Every component placed anywhere in the forest so far
    reached: HashSet<usize>,
    /// Current root-to-node path
    path: HashSet<usize>,
    stats: ForestStats,
}

/// A node under construction and how far through its references we are
struct Frame {
    idx: usize,
    next_reference: usize,
    node: DependencyTreeNode,
}

impl Walk<'_> {
    fn enter(&mut self, idx: usize, level: usize) -> Frame {
        self.reached.insert(idx);
        self.path.insert(idx);
        self.placed += 1;
        self.deepest = self.deepest.max(level);
        Frame {
            idx,
            next_reference: 0,
            node: DependencyTreeNode::leaf(self.components[idx].clone(), level),
        }
    }

    fn budget_spent(&self) -> bool {
        self.max_nodes > 0 && self.placed >= self.max_nodes
    }

    /// Depth-first expansion of one root.
    fn expand(&mut self, root: usize) -> DependencyTreeNode {
        let components = self.components;
        let mut root_frame = self.enter(root, 0);
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let frame = stack.last_mut().unwrap_or(&mut root_frame);
            let level = frame.node.level;
            let Some(reference) = components[frame.idx].dependencies.get(frame.next_reference)
            else {
                // Every reference handled: attach the finished node to its parent
                match stack.pop() {
                    Some(done) => {
                        self.path.remove(&done.idx);
                        let parent = stack.last_mut().unwrap_or(&mut root_frame);
                        parent.node.children.push(done.node);
                        continue;
                    }
                    None => {
                        self.path.remove(&root);
                        return root_frame.node;
                    }
                }
            };
            frame.next_reference += 1;

            let Some(child) = self.index.resolve(reference) else {
                continue;
            };
            if self.path.contains(&child) {
                self.stats.truncated_cycles += 1;
                continue;
            }
            if self.max_depth > 0 && level >= self.max_depth {
                self.stats.depth_limited += 1;
                continue;
            }
            if self.budget_spent() {
                self.stats.node_limited += 1;
                continue;
            }
            let child_frame = self.enter(child, level + 1);
            stack.push(child_frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(name: &str, deps: &[&str]) -> SbomComponent {
        deps.iter()
            .fold(SbomComponent::new(name), |c, d| c.depends_on(*d))
    }

    #[test]
    fn test_two_node_cycle_is_truncated() {
        let components = vec![comp("a", &["b"]), comp("b", &["a"])];
        let forest = DependencyGraphBuilder::new().build(&components);

        assert_eq!(forest.len(), 1);
        let a = &forest.roots[0];
        assert_eq!(a.key(), "a");
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].key(), "b");
        assert_eq!(a.children[0].level, 1);
        assert!(a.children[0].children.is_empty());
        assert_eq!(forest.stats.truncated_cycles, 1);
    }

    #[test]
    fn test_diamond_keeps_shared_dependency_in_both_branches() {
        let components = vec![
            comp("app", &["left", "right"]),
            comp("left", &["shared"]),
            comp("right", &["shared"]),
            comp("shared", &[]),
        ];
        let forest = DependencyGraphBuilder::new().build(&components);

        assert_eq!(forest.len(), 1);
        let shared_count = forest.nodes().filter(|n| n.key() == "shared").count();
        assert_eq!(shared_count, 2);
        assert_eq!(forest.stats.nodes, 5);
        assert_eq!(forest.stats.max_depth, 2);
    }

    #[test]
    fn test_unreached_components_become_roots_in_order() {
        let components = vec![
            comp("lib", &[]),
            comp("app", &["lib"]),
            comp("tool", &[]),
        ];
        let roots = build_forest(&components);
        let keys: Vec<_> = roots.iter().map(DependencyTreeNode::key).collect();
        // "lib" was rooted first, so it is not reached by "app" beforehand
        assert_eq!(keys, vec!["lib", "app", "tool"]);
        assert_eq!(roots[1].children[0].key(), "lib");
    }

    #[test]
    fn test_purl_keys_and_name_fallback() {
        let components = vec![
            comp("web", &["pkg:npm/lodash@4.17.21", "chalk"]),
            SbomComponent::new("lodash").with_purl("pkg:npm/lodash@4.17.21"),
            SbomComponent::new("chalk").with_purl("pkg:npm/chalk@5.3.0"),
        ];
        let forest = DependencyGraphBuilder::new().build(&components);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.roots[0].children.len(), 2);

        let strict = DependencyGraphBuilder::with_config(GraphConfig {
            resolve_by_name: false,
            ..GraphConfig::default()
        })
        .build(&components);
        // "chalk" no longer resolves, so it is rooted on its own
        assert_eq!(strict.roots[0].children.len(), 1);
        assert_eq!(strict.len(), 2);
        assert_eq!(strict.stats.unresolved_references, 1);
    }

    #[test]
    fn test_unresolved_references_are_dropped() {
        let components = vec![comp("a", &["ghost", "b"]), comp("b", &[])];
        let forest = DependencyGraphBuilder::new().build(&components);
        assert_eq!(forest.roots[0].children.len(), 1);
        assert_eq!(forest.stats.unresolved_references, 1);
    }

    #[test]
    fn test_self_dependency() {
        let forest = DependencyGraphBuilder::new().build(&[comp("a", &["a"])]);
        assert_eq!(forest.len(), 1);
        assert!(forest.roots[0].children.is_empty());
        assert_eq!(forest.stats.truncated_cycles, 1);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let components = vec![comp("a", &["b"]), comp("b", &["c"]), comp("c", &[])];
        let forest = DependencyGraphBuilder::with_config(GraphConfig {
            max_depth: 1,
            ..GraphConfig::default()
        })
        .build(&components);

        assert_eq!(forest.stats.max_depth, 1);
        assert_eq!(forest.stats.depth_limited, 1);
        // "c" was never reached, so it gets its own root
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_node_budget_cuts_branches() {
        let components = vec![comp("a", &["b"]), comp("b", &["c"]), comp("c", &[])];
        let forest = DependencyGraphBuilder::with_config(GraphConfig {
            max_nodes: 2,
            ..GraphConfig::default()
        })
        .build(&components);

        assert_eq!(forest.stats.node_limited, 1);
        // "c" was cut from the tree but still gets a root of its own
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.stats.nodes, 3);
        assert_eq!(forest.roots[1].key(), "c");
    }

    #[test]
    fn test_duplicate_keys_resolve_to_first() {
        let components = vec![
            SbomComponent::new("a").with_version("1.0.0"),
            SbomComponent::new("a").with_version("2.0.0"),
        ];
        let forest = DependencyGraphBuilder::new().build(&components);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.roots[0].component.version.as_deref(), Some("1.0.0"));
        assert_eq!(forest.stats.duplicate_keys, 1);
    }

    #[test]
    fn test_empty_input() {
        let forest = DependencyGraphBuilder::new().build(&[]);
        assert!(forest.is_empty());
        assert_eq!(forest.stats, ForestStats::default());
    }
}
