//! Archive cache for skillpack
//!
//! Download archives are gzip-compressed tarballs with one top-level folder
//! per package. Each archive is built at most once per cache key and kept
//! on disk until the whole cache is invalidated.

pub mod key;
pub mod store;
pub mod tarball;

// Re-export main types
pub use key::CacheKey;
pub use store::{ArchiveCache, ArchiveLimits, ArchiveMember, CacheEntry};
pub use tarball::{create_archive, extract_archive, ArchiveSummary};

use skillpack_core::error::SkillError;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, SkillError>;

/// Extension shared by every cached archive
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";
