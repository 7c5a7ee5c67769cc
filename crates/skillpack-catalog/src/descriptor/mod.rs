//! Skill descriptor (`skill.md`) extraction
//!
//! Extraction is best effort: nothing in a descriptor is ever a hard error.
//! Identity comes from a `key: value` line near the top, dependencies from a
//! front matter `dependencies: [...]` list and inline `<skill>id</skill>`
//! markers.

use once_cell::sync::Lazy;
use regex::Regex;
use skillpack_core::error::SkillError;
use std::collections::BTreeSet;
use std::path::Path;

use crate::CatalogResult;

/// Descriptor file name, matched case-insensitively
pub const DESCRIPTOR_FILE_NAME: &str = "skill.md";

/// Number of leading lines searched for `name:` / `description:`
const IDENTITY_LINES: usize = 5;

static FRONT_MATTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---").expect("front matter pattern"));

static DEPENDENCY_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)dependencies:\s*\[(.*?)\]").expect("dependency list pattern"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]+").expect("identifier pattern"));

static SKILL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<skill>([A-Za-z0-9_-]+)</skill>").expect("skill tag pattern"));

/// What a descriptor declares about its package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Union of front matter and inline references, sorted
    pub dependencies: BTreeSet<String>,
}

/// Parse descriptor text
pub fn parse_descriptor(content: &str) -> Descriptor {
    let (name, description) = parse_identity(content);

    let mut dependencies = front_matter_dependencies(content);
    dependencies.extend(inline_dependencies(content));

    Descriptor {
        name,
        description,
        dependencies,
    }
}

/// Read and parse a descriptor file
pub fn read_descriptor(path: &Path) -> CatalogResult<Descriptor> {
    let content = std::fs::read_to_string(path).map_err(|e| SkillError::Descriptor {
        id: package_id_of(path),
        message: e.to_string(),
    })?;
    Ok(parse_descriptor(&content))
}

fn package_id_of(descriptor: &Path) -> String {
    descriptor
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_identity(content: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut description = None;

    for line in content.lines().take(IDENTITY_LINES) {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("name:") {
            name = non_empty(value);
        } else if let Some(value) = line.strip_prefix("description:") {
            description = non_empty(value);
        }
    }

    (name, description)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn front_matter_dependencies(content: &str) -> BTreeSet<String> {
    let Some(front_matter) = FRONT_MATTER.captures(content).and_then(|c| c.get(1)) else {
        return BTreeSet::new();
    };
    let Some(list) = DEPENDENCY_LIST
        .captures(front_matter.as_str())
        .and_then(|c| c.get(1))
    else {
        return BTreeSet::new();
    };

    IDENTIFIER
        .find_iter(list.as_str())
        .map(|m| m.as_str().to_string())
        .collect()
}

fn inline_dependencies(content: &str) -> impl Iterator<Item = String> + '_ {
    SKILL_TAG
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
