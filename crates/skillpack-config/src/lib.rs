//! Configuration parsing for skillpack
//!
//! This crate handles parsing and validation of skillpack.toml files and
//! layers them with a global config, environment variables and CLI flags.

pub mod merge;
pub mod toml;

// Re-export main types
pub use crate::merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use crate::toml::{CacheSection, RefreshSection, RepositorySection, ServerSection, SkillpackToml};

use skillpack_core::error::SkillError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SkillError>;

/// File name looked up in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = "skillpack.toml";
