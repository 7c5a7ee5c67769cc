//! Tarball creation and extraction
//!
//! Archives hold one top-level folder per package, named after the package
//! id, and are written deterministically so a rebuild of unchanged sources
//! yields identical bytes.

pub mod create;
pub mod extract;

// Re-export main functions
pub use create::{create_archive, ArchiveSummary};
pub use extract::extract_archive;
