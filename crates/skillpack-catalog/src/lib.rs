//! Catalog construction for skillpack
//!
//! This crate turns a directory of skill folders into a `Catalog`:
//! descriptor parsing, directory scanning, and the git sync collaborator
//! that reports whether the checkout materially changed.

pub mod descriptor;
pub mod scan;
pub mod sync;

// Re-export main types
pub use descriptor::{parse_descriptor, read_descriptor, Descriptor, DESCRIPTOR_FILE_NAME};
pub use scan::{find_descriptor, scan_catalog};
pub use sync::{GitSync, SyncOutcome};

use skillpack_core::error::SkillError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, SkillError>;
