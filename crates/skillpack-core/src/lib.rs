//! # skillpack-core
//!
//! Core types and utilities shared across all skillpack crates.
//!
//! This crate provides:
//! - `Package` and `Catalog` types describing the skill repository
//! - `CatalogHandle` for swapping catalog snapshots by reference
//! - `SkillError` enum for unified error handling
//! - Path helpers for keeping package ids inside their directories
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Package, Catalog, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{SkillError, SkillResult};
pub use types::{Catalog, CatalogHandle, Package};
