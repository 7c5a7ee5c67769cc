//! Dependency tree construction
//!
//! The tree repeats a dependency under every parent that declares it. Cycle
//! detection only looks at the current root-to-node path, so a package shared
//! by two branches is expanded in both, while a package that reappears below
//! itself becomes a single `circular` leaf.

use serde::Serialize;
use skillpack_core::Catalog;

/// One node of a resolved dependency tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionNode {
    /// Package id as referenced by the parent
    pub id: String,
    /// Whether the id is present in the catalog
    pub exists: bool,
    /// Whether the id already appears on the path from the root
    pub circular: bool,
    /// Dependencies in declaration order; empty for circular and missing nodes
    pub children: Vec<ResolutionNode>,
}

impl ResolutionNode {
    fn missing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            exists: false,
            circular: false,
            children: Vec::new(),
        }
    }

    fn circular(id: &str) -> Self {
        Self {
            id: id.to_string(),
            exists: true,
            circular: true,
            children: Vec::new(),
        }
    }

    /// Total number of nodes, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ResolutionNode::node_count).sum::<usize>()
    }

    /// Depth of the deepest leaf, the root being 0
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Whether any node in the subtree closes a cycle
    pub fn has_cycle(&self) -> bool {
        self.circular || self.children.iter().any(ResolutionNode::has_cycle)
    }

    /// Ids of missing references anywhere in the subtree, first-seen order
    pub fn missing_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_missing(&mut out);
        out
    }

    fn collect_missing<'a>(&'a self, out: &mut Vec<&'a str>) {
        if !self.exists && !out.contains(&self.id.as_str()) {
            out.push(&self.id);
        }
        for child in &self.children {
            child.collect_missing(out);
        }
    }
}

/// Ancestors of the node being built, innermost first.
///
/// Lives on the call stack, so each branch sees only its own path and
/// siblings never observe each other's entries.
struct PathLink<'a> {
    id: &'a str,
    parent: Option<&'a PathLink<'a>>,
}

impl PathLink<'_> {
    fn contains(&self, id: &str) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.id == id {
                return true;
            }
            link = current.parent;
        }
        false
    }
}

/// Build the dependency tree rooted at `root`.
///
/// Never fails: an id absent from the catalog yields a `missing` node, even
/// at the root.
pub fn build_tree(catalog: &Catalog, root: &str) -> ResolutionNode {
    descend(catalog, root, None)
}

fn descend(catalog: &Catalog, id: &str, path: Option<&PathLink<'_>>) -> ResolutionNode {
    let Some(package) = catalog.get(id) else {
        return ResolutionNode::missing(id);
    };

    if path.map_or(false, |p| p.contains(id)) {
        return ResolutionNode::circular(id);
    }

    let here = PathLink { id, parent: path };
    let children = package
        .dependencies
        .iter()
        .map(|dep| descend(catalog, dep, Some(&here)))
        .collect();

    ResolutionNode {
        id: id.to_string(),
        exists: true,
        circular: false,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillpack_core::Package;

    fn catalog(edges: &[(&str, &[&str])]) -> Catalog {
        edges
            .iter()
            .map(|(id, deps)| {
                Package::new(*id, format!("/skills/{id}")).with_dependencies(deps.iter().copied())
            })
            .collect()
    }

    fn child_ids(node: &ResolutionNode) -> Vec<&str> {
        node.children.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_leaf_package() {
        let catalog = catalog(&[("A", &[])]);
        let tree = build_tree(&catalog, "A");

        assert_eq!(tree.id, "A");
        assert!(tree.exists);
        assert!(!tree.circular);
        assert!(tree.children.is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_missing_root() {
        let tree = build_tree(&Catalog::new(), "ghost");

        assert_eq!(tree, ResolutionNode::missing("ghost"));
        assert_eq!(tree.missing_ids(), vec!["ghost"]);
    }

    #[test]
    fn test_two_cycle_closes_at_root() {
        let catalog = catalog(&[("A", &["B"]), ("B", &["A"])]);
        let tree = build_tree(&catalog, "A");

        assert_eq!(child_ids(&tree), vec!["B"]);
        let b = &tree.children[0];
        assert!(!b.circular);
        assert_eq!(child_ids(b), vec!["A"]);

        let back = &b.children[0];
        assert!(back.circular);
        assert!(back.exists);
        assert!(back.children.is_empty());
        assert!(tree.has_cycle());
    }

    #[test]
    fn test_self_dependency() {
        let catalog = catalog(&[("A", &["A"])]);
        let tree = build_tree(&catalog, "A");

        assert_eq!(tree.children.len(), 1);
        assert!(tree.children[0].circular);
    }

    #[test]
    fn test_diamond_repeats_shared_dependency() {
        let catalog = catalog(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
        let tree = build_tree(&catalog, "A");

        assert_eq!(child_ids(&tree), vec!["B", "C"]);
        for branch in &tree.children {
            assert_eq!(child_ids(branch), vec!["D"]);
            assert!(!branch.children[0].circular);
        }
        assert!(!tree.has_cycle());
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_sibling_branches_do_not_share_path() {
        // C is below B and again directly below A; neither occurrence is circular
        let catalog = catalog(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let tree = build_tree(&catalog, "A");

        assert!(!tree.has_cycle());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_missing_dependency_is_leaf() {
        let catalog = catalog(&[("A", &["B", "gone"]), ("B", &["gone"])]);
        let tree = build_tree(&catalog, "A");

        let gone = &tree.children[1];
        assert!(!gone.exists);
        assert!(!gone.circular);
        assert!(gone.children.is_empty());
        assert_eq!(tree.missing_ids(), vec!["gone"]);
    }

    #[test]
    fn test_serializes_as_nested_json() {
        let catalog = catalog(&[("A", &["B"]), ("B", &[])]);
        let json = serde_json::to_value(build_tree(&catalog, "A")).unwrap();

        assert_eq!(json["id"], "A");
        assert_eq!(json["children"][0]["id"], "B");
        assert_eq!(json["children"][0]["exists"], true);
    }
}
