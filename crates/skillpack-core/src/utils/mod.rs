//! Utility functions and helpers.
//!
//! Common functionality used across multiple skillpack crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{contained_relative, is_hidden, is_safe_path, safe_join};
