//! Error types and result aliases for skillpack operations.
//!
//! Provides a unified error type covering catalog, cache and sync failures.
//! Circular and missing dependencies are not errors: they are reported as
//! data on resolution nodes.

use thiserror::Error;

/// Unified error type for all skillpack operations
#[derive(Error, Debug)]
pub enum SkillError {
    // Config errors
    #[error("Failed to parse skillpack.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Catalog errors
    #[error("Skill '{id}' not found")]
    PackageNotFound { id: String },

    #[error("Failed to read descriptor for '{id}': {message}")]
    Descriptor { id: String, message: String },

    #[error("Repository sync failed: {message}")]
    Sync { message: String },

    // Cache errors
    #[error("Invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Failed to build archive '{key}': {message}")]
    CacheBuild {
        key: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Archive '{key}' exceeded its limit: {reason}")]
    ArchiveLimit { key: String, reason: String },

    #[error("Refusing to write outside the target directory: {path}")]
    UnsafePath { path: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for skillpack operations
pub type SkillResult<T> = Result<T, SkillError>;

impl SkillError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a cache build error for `key` from an IO failure
    pub fn cache_build(key: &str, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::CacheBuild {
            key: key.to_string(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a not-found error for a skill id
    pub fn not_found(id: &str) -> Self {
        Self::PackageNotFound { id: id.to_string() }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SkillError::Sync { .. } | SkillError::Io { .. } | SkillError::CacheBuild { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SkillError::PackageNotFound { .. } => {
                Some("Check the skill id spelling or run 'skillpack list' to see available skills")
            },
            SkillError::Sync { .. } => {
                Some("Check that git is installed and the repository URL is reachable")
            },
            SkillError::InvalidKey { .. } => {
                Some("Use '<id>', '<id>-with-deps' or 'all' as the archive key")
            },
            SkillError::ArchiveLimit { .. } => {
                Some("Raise [cache] max_archive_bytes or build_timeout_secs in skillpack.toml")
            },
            SkillError::CacheBuild { .. } => {
                Some("Run 'skillpack clean' and retry; check free disk space")
            },
            _ => None,
        }
    }
}
