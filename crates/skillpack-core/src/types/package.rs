//! Skill package types.
//!
//! A package is one folder of the skill repository together with the
//! metadata extracted from its descriptor.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A skill package as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Folder name, unique within a catalog
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Declared dependency ids, in declaration order. May name packages
    /// that are absent from the catalog.
    pub dependencies: IndexSet<String>,
    /// Folder on disk holding the package contents
    pub source_dir: PathBuf,
}

impl Package {
    /// Create a package with no metadata and no dependencies
    pub fn new(id: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            dependencies: IndexSet::new(),
            source_dir: source_dir.into(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append declared dependencies, dropping repeats
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Check if this is a valid package id (a single plain path component)
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id != "."
            && id != ".."
            && !id.starts_with('.')
            && !id.contains(['/', '\\', '\0'])
    }

    /// Case-insensitive keyword match on name or description
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return true;
        }
        let keyword = keyword.to_lowercase();
        [self.name.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&keyword))
    }

    /// Folder on disk holding the package contents
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}
