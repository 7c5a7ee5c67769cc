//! Dependency resolution engine for skillpack
//!
//! Two traversals over one catalog snapshot, kept deliberately separate:
//! - `tree`: the full dependency structure for display, repeating shared
//!   dependencies and marking the point where each cycle closes
//! - `flatten`: the minimal install set, every package once
//!
//! plus a renderer for trees and petgraph-based catalog diagnostics.

pub mod flatten;
pub mod graph;
pub mod render;
pub mod resolve;
pub mod tree;

// Re-export main types
pub use flatten::flatten;
pub use graph::{CatalogGraph, MissingReference};
pub use render::render;
pub use resolve::Resolver;
pub use tree::{build_tree, ResolutionNode};

use skillpack_core::error::SkillError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SkillError>;
