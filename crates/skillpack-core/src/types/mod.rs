//! Core data types for skillpack.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Package metadata and declared dependencies
//! - Catalog snapshots and the handle used to swap them

pub mod catalog;
pub mod package;

// Re-export all public types
pub use catalog::{Catalog, CatalogHandle};
pub use package::Package;
