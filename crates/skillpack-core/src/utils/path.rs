//! Path helpers for archive entries and skill folders.
//!
//! Archive entries and package ids both end up as paths under a directory we
//! own; these helpers keep them there.

use crate::error::{SkillError, SkillResult};
use std::path::{Component, Path, PathBuf};

/// Relative form of `path` with `.` and `..` folded away, or `None` if it is
/// absolute or climbs above its starting point
pub fn contained_relative(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {},
            Component::ParentDir => {
                parts.pop()?;
            },
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(parts.into_iter().collect())
}

/// Check if a path stays inside whatever directory it is joined onto
pub fn is_safe_path(path: &Path) -> bool {
    contained_relative(path).is_some()
}

/// Join an untrusted relative `path` onto `base`, rejecting traversal
pub fn safe_join(base: &Path, path: &Path) -> SkillResult<PathBuf> {
    match contained_relative(path) {
        Some(relative) => Ok(base.join(relative)),
        None => Err(SkillError::UnsafePath {
            path: path.display().to_string(),
        }),
    }
}

/// Dot-prefixed entries (`.git`, the archive cache) are never skills
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with('.'))
}
