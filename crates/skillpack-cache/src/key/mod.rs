//! Cache keys and their archive file names

use serde::Serialize;
use skillpack_core::error::SkillError;
use skillpack_core::Package;
use std::fmt;

use crate::{CacheResult, ARCHIVE_EXTENSION};

const ALL_STEM: &str = "all";
const WITH_DEPS_SUFFIX: &str = "-with-deps";

/// Identifies one downloadable archive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CacheKey {
    /// A package together with its flattened dependencies
    WithDeps(String),
    /// Every package in the catalog
    All,
    /// A single package without dependencies
    Single(String),
}

impl CacheKey {
    /// Parse a request string such as `devops-flow-with-deps`, `all` or
    /// `devops-flow`. A trailing `.tar.gz` is accepted and ignored.
    ///
    /// `all` and the `-with-deps` suffix take precedence over package ids
    /// that happen to look the same.
    pub fn parse(input: &str) -> CacheResult<Self> {
        let raw = input.trim();
        let stem = raw.strip_suffix(ARCHIVE_EXTENSION).unwrap_or(raw);

        if stem == ALL_STEM {
            return Ok(CacheKey::All);
        }

        let key = match stem.strip_suffix(WITH_DEPS_SUFFIX) {
            Some(id) if !id.is_empty() => CacheKey::WithDeps(id.to_string()),
            _ => CacheKey::Single(stem.to_string()),
        };

        match key.package_id() {
            Some(id) if !Package::is_valid_id(id) => Err(SkillError::InvalidKey {
                key: input.to_string(),
                reason: format!("'{}' is not a valid skill id", id),
            }),
            _ => Ok(key),
        }
    }

    /// The package this key is about, if any
    pub fn package_id(&self) -> Option<&str> {
        match self {
            CacheKey::WithDeps(id) | CacheKey::Single(id) => Some(id),
            CacheKey::All => None,
        }
    }

    /// File name without extension, also used in download URLs
    pub fn stem(&self) -> String {
        match self {
            CacheKey::WithDeps(id) => format!("{}{}", id, WITH_DEPS_SUFFIX),
            CacheKey::All => ALL_STEM.to_string(),
            CacheKey::Single(id) => id.clone(),
        }
    }

    /// Archive file name inside the cache directory
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem(), ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(CacheKey::WithDeps("devops-flow".into()).file_name(), "devops-flow-with-deps.tar.gz");
        assert_eq!(CacheKey::All.file_name(), "all.tar.gz");
        assert_eq!(CacheKey::Single("tdd".into()).file_name(), "tdd.tar.gz");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(CacheKey::parse("all").unwrap(), CacheKey::All);
        assert_eq!(
            CacheKey::parse("devops-flow-with-deps").unwrap(),
            CacheKey::WithDeps("devops-flow".into())
        );
        assert_eq!(CacheKey::parse("tdd").unwrap(), CacheKey::Single("tdd".into()));
        assert_eq!(
            CacheKey::parse("tdd-with-deps.tar.gz").unwrap(),
            CacheKey::WithDeps("tdd".into())
        );
    }

    #[test]
    fn test_parse_bare_suffix_is_single() {
        assert_eq!(
            CacheKey::parse("-with-deps").unwrap(),
            CacheKey::Single("-with-deps".into())
        );
    }

    #[test]
    fn test_parse_rejects_paths() {
        for bad in ["", "..", "../etc-with-deps", "a/b", ".hidden", "x\\y"] {
            let err = CacheKey::parse(bad).unwrap_err();
            assert!(matches!(err, SkillError::InvalidKey { .. }), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_stem_round_trips_through_parse() {
        for key in [
            CacheKey::All,
            CacheKey::WithDeps("writing-plans".into()),
            CacheKey::Single("writing-plans".into()),
        ] {
            assert_eq!(CacheKey::parse(&key.stem()).unwrap(), key);
            assert_eq!(key.to_string(), key.stem());
        }
    }
}
