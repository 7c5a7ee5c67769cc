//! Resolver over a single catalog snapshot

use skillpack_core::error::SkillError;
use skillpack_core::Catalog;
use std::sync::Arc;
use tracing::debug;

use crate::flatten::flatten;
use crate::render::render;
use crate::tree::{build_tree, ResolutionNode};
use crate::ResolverResult;

/// Resolves dependencies against one immutable catalog.
///
/// Holding the snapshot keeps a whole request consistent even if the
/// catalog is replaced while it runs.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
}

impl Resolver {
    /// Create a resolver for `catalog`
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Snapshot being resolved against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Full dependency tree, see [`build_tree`]
    pub fn tree(&self, root: &str) -> ResolutionNode {
        build_tree(&self.catalog, root)
    }

    /// Rendered dependency tree, see [`render`]
    pub fn render_tree(&self, root: &str) -> String {
        render(&self.tree(root))
    }

    /// Transitive dependencies, see [`flatten`]
    pub fn flatten(&self, root: &str) -> Vec<String> {
        flatten(&self.catalog, root)
    }

    /// Packages to ship for `root`: the root first, then its flattened
    /// dependencies.
    pub fn install_set(&self, root: &str) -> ResolverResult<Vec<String>> {
        if !self.catalog.contains(root) {
            return Err(SkillError::not_found(root));
        }

        let mut ids = vec![root.to_string()];
        ids.extend(self.flatten(root));

        debug!(skill = root, count = ids.len(), "Resolved install set");
        Ok(ids)
    }
}
