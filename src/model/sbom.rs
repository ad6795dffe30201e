//! Normalized SBOM component and dependency tree structures.

use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single SBOM component, reduced to the fields every supported shape carries.
///
/// Dependency references are the names or package-URLs of other components
/// in the same normalized list, never nested objects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SbomComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub licenses: Vec<String>,
}

impl SbomComponent {
    /// Create a component with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style version setter
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builder-style purl setter
    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    /// Builder-style dependency reference
    #[must_use]
    pub fn depends_on(mut self, reference: impl Into<String>) -> Self {
        self.dependencies.push(reference.into());
        self
    }

    /// Graph key: the package-URL when present, else the name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.purl.as_deref().unwrap_or(&self.name)
    }

    /// Ecosystem (purl type) when the package-URL parses.
    #[must_use]
    pub fn ecosystem(&self) -> Option<String> {
        let purl = self.purl.as_deref()?;
        PackageUrl::from_str(purl)
            .ok()
            .map(|p| p.ty().to_lowercase())
    }

    /// Add a dependency reference unless already present.
    pub fn add_dependency(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        if !self.dependencies.contains(&reference) {
            self.dependencies.push(reference);
        }
    }
}

/// One node of a dependency forest.
///
/// Acyclic by construction: no node has its own key among its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTreeNode {
    pub component: SbomComponent,
    pub children: Vec<DependencyTreeNode>,
    /// Depth below the forest root (roots are level 0)
    pub level: usize,
}

impl DependencyTreeNode {
    /// Create a leaf node
    #[must_use]
    pub const fn leaf(component: SbomComponent, level: usize) -> Self {
        Self {
            component,
            children: Vec::new(),
            level,
        }
    }

    /// Graph key of the wrapped component
    #[must_use]
    pub fn key(&self) -> &str {
        self.component.key()
    }

    /// Number of nodes in this subtree, including self
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Deepest level reached in this subtree
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.walk().map(|n| n.level).max().unwrap_or(self.level)
    }

    /// Depth-first iteration over the subtree
    pub fn walk(&self) -> impl Iterator<Item = &DependencyTreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Whether any root-to-node path repeats a key.
    #[must_use]
    pub fn has_ancestor_cycle(&self) -> bool {
        // (node, number of ancestors above it)
        let mut stack = vec![(self, 0usize)];
        let mut path: Vec<&str> = Vec::new();
        while let Some((node, depth)) = stack.pop() {
            path.truncate(depth);
            if path.contains(&node.key()) {
                return true;
            }
            path.push(node.key());
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
        false
    }
}

impl Drop for DependencyTreeNode {
    // Flatten before dropping so deep chains do not recurse
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
