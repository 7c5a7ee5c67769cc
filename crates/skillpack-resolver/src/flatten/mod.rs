//! Install set flattening
//!
//! Unlike tree building, flattening uses one visited set for the whole walk,
//! seeded with the root. Each package is therefore emitted at most once and
//! the root never appears in its own dependency list.

use skillpack_core::Catalog;
use std::collections::HashSet;

/// Transitive dependencies of `root` that exist in the catalog.
///
/// Order is depth-first pre-order following declaration order. Missing ids
/// are skipped, and so is their subtree. A root absent from the catalog
/// yields an empty list.
pub fn flatten(catalog: &Catalog, root: &str) -> Vec<String> {
    let mut visited = HashSet::from([root]);
    let mut out = Vec::new();
    visit(catalog, root, &mut visited, &mut out);
    out
}

fn visit<'a>(catalog: &'a Catalog, id: &str, visited: &mut HashSet<&'a str>, out: &mut Vec<String>) {
    let Some(package) = catalog.get(id) else {
        return;
    };

    for dep in &package.dependencies {
        if !visited.insert(dep.as_str()) {
            continue;
        }
        if catalog.contains(dep) {
            out.push(dep.clone());
            visit(catalog, dep, visited, out);
        }
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

    #[test]
    fn test_no_dependencies() {
        let catalog = catalog(&[("A", &[])]);
        assert!(flatten(&catalog, "A").is_empty());
    }

    #[test]
    fn test_diamond_visits_shared_once() {
        let catalog = catalog(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
        assert_eq!(flatten(&catalog, "A"), vec!["B", "D", "C"]);
    }

    #[test]
    fn test_cycle_back_to_root() {
        let catalog = catalog(&[("A", &["B"]), ("B", &["A"])]);
        assert_eq!(flatten(&catalog, "A"), vec!["B"]);
    }

    #[test]
    fn test_self_dependency_excluded() {
        let catalog = catalog(&[("A", &["A", "B"]), ("B", &[])]);
        assert_eq!(flatten(&catalog, "A"), vec!["B"]);
    }

    #[test]
    fn test_missing_ids_skipped() {
        let catalog = catalog(&[("A", &["gone", "B"]), ("B", &["gone", "C"]), ("C", &[])]);
        assert_eq!(flatten(&catalog, "A"), vec!["B", "C"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        assert!(flatten(&Catalog::new(), "ghost").is_empty());
    }

    #[test]
    fn test_depth_first_preorder() {
        let catalog = catalog(&[
            ("A", &["B", "E"]),
            ("B", &["C"]),
            ("C", &["D"]),
            ("D", &[]),
            ("E", &["C"]),
        ]);
        assert_eq!(flatten(&catalog, "A"), vec!["B", "C", "D", "E"]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::tree::{build_tree, ResolutionNode};
    use proptest::prelude::*;
    use skillpack_core::Package;
    use std::collections::BTreeSet;

    const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    /// Up to six packages, each depending on up to three ids drawn from a
    /// pool that also contains two ids outside the catalog
    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        let pool = prop::sample::select(vec!["a", "b", "c", "d", "e", "f", "x", "y"]);
        prop::collection::vec(prop::collection::vec(pool, 0..4), 1..=IDS.len()).prop_map(|deps| {
            deps.into_iter()
                .zip(IDS)
                .map(|(deps, id)| Package::new(id, format!("/skills/{id}")).with_dependencies(deps))
                .collect::<Catalog>()
        })
    }

    fn reachable(catalog: &Catalog, root: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(pkg) = catalog.get(&id) {
                for dep in &pkg.dependencies {
                    if catalog.contains(dep) && seen.insert(dep.clone()) {
                        stack.push(dep.clone());
                    }
                }
            }
        }
        seen.remove(root);
        seen
    }

    fn check_path(node: &ResolutionNode, path: &mut Vec<String>) -> Result<(), TestCaseError> {
        if node.circular || !node.exists {
            prop_assert!(node.children.is_empty());
        }
        if node.circular {
            prop_assert!(path.contains(&node.id));
        } else if node.exists {
            prop_assert!(!path.contains(&node.id));
        }
        path.push(node.id.clone());
        for child in &node.children {
            check_path(child, path)?;
        }
        path.pop();
        Ok(())
    }

    proptest! {
        #[test]
        fn flatten_is_unique_reachable_set(catalog in arb_catalog()) {
            for root in catalog.ids() {
                let flat = flatten(&catalog, root);
                let unique: BTreeSet<String> = flat.iter().cloned().collect();

                prop_assert_eq!(unique.len(), flat.len());
                prop_assert!(!flat.iter().any(|id| id == root));
                prop_assert_eq!(unique, reachable(&catalog, root));
            }
        }

        #[test]
        fn tree_marks_cycles_on_path_only(catalog in arb_catalog()) {
            for root in catalog.ids() {
                let tree = build_tree(&catalog, root);
                prop_assert_eq!(&tree.id, root);
                check_path(&tree, &mut Vec::new())?;
            }
        }
    }
}
