//! Plain-text rendering of dependency trees
//!
//! ```text
//! devops-flow
//! ├── executing-plans
//!     └── writing-plans
//! └── writing-plans
//! ```
//!
//! Children are indented four spaces per level below the first, without
//! vertical guide lines.

use std::fmt::{self, Write};

use crate::tree::ResolutionNode;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const INDENT: &str = "    ";

const CIRCULAR_SUFFIX: &str = " [circular]";
const MISSING_SUFFIX: &str = " [missing]";

/// Render a tree as text, one node per line, no trailing newline
pub fn render(node: &ResolutionNode) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_node(&mut out, node, 0, "");
    out
}

fn write_node(out: &mut String, node: &ResolutionNode, depth: usize, prefix: &str) -> fmt::Result {
    if depth > 0 {
        out.push('\n');
    }
    write!(out, "{}{}", prefix, node.id)?;

    if node.circular {
        return out.write_str(CIRCULAR_SUFFIX);
    }
    if !node.exists {
        return out.write_str(MISSING_SUFFIX);
    }

    let last = node.children.len().saturating_sub(1);
    for (index, child) in node.children.iter().enumerate() {
        let branch = if index == last { LAST_BRANCH } else { BRANCH };
        let child_prefix = format!("{}{}", INDENT.repeat(depth), branch);
        write_node(out, child, depth + 1, &child_prefix)?;
    }
    Ok(())
}

impl fmt::Display for ResolutionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;
    use skillpack_core::{Catalog, Package};

    fn catalog(edges: &[(&str, &[&str])]) -> Catalog {
        edges
            .iter()
            .map(|(id, deps)| {
                Package::new(*id, format!("/skills/{id}")).with_dependencies(deps.iter().copied())
            })
            .collect()
    }

    #[test]
    fn test_single_node() {
        let catalog = catalog(&[("A", &[])]);
        assert_eq!(render(&build_tree(&catalog, "A")), "A");
    }

    #[test]
    fn test_missing_root_single_line() {
        assert_eq!(render(&build_tree(&Catalog::new(), "ghost")), "ghost [missing]");
    }

    #[test]
    fn test_branch_glyphs_and_indent() {
        let catalog = catalog(&[
            ("A", &["B", "C"]),
            ("B", &["D", "E"]),
            ("C", &[]),
            ("D", &[]),
            ("E", &[]),
        ]);

        let expected = "A\n├── B\n    ├── D\n    └── E\n└── C";
        assert_eq!(render(&build_tree(&catalog, "A")), expected);
    }

    #[test]
    fn test_circular_and_missing_suffixes() {
        let catalog = catalog(&[("A", &["B", "gone"]), ("B", &["A"])]);

        let expected = "A\n├── B\n    └── A [circular]\n└── gone [missing]";
        assert_eq!(render(&build_tree(&catalog, "A")), expected);
    }

    #[test]
    fn test_render_is_pure() {
        let catalog = catalog(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
        let tree = build_tree(&catalog, "A");

        let first = render(&tree);
        assert_eq!(first, render(&tree));
        assert_eq!(first, tree.to_string());
        assert!(!first.ends_with('\n'));
    }
}
