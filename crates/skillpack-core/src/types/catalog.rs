//! Catalog snapshots.
//!
//! A `Catalog` is never mutated after it is published. Rebuilds produce a new
//! catalog which is swapped into a `CatalogHandle`; callers that already hold
//! a snapshot keep reading the old one.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Package;

/// Immutable mapping from package id to package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    packages: BTreeMap<String, Package>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a package by id
    pub fn get(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    /// Check if a package id exists
    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    /// All package ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// All packages in id order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Packages whose name or description contains `keyword`
    pub fn search<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Package> + 'a {
        self.packages.values().filter(move |pkg| pkg.matches_keyword(keyword))
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<Package> for Catalog {
    /// Later packages replace earlier ones with the same id
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let packages = iter
            .into_iter()
            .map(|pkg| (pkg.id.clone(), pkg))
            .collect();
        Self { packages }
    }
}

/// Shared, swappable reference to the current catalog
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    /// Create a handle publishing `catalog`
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Current snapshot. Stays valid after later `replace` calls.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Publish a new catalog and return the one it replaced
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        std::mem::replace(&mut *self.current.write(), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(id: &str) -> Package {
        Package::new(id, format!("/skills/{id}"))
    }

    #[test]
    fn test_catalog_is_sorted_by_id() {
        let catalog: Catalog = vec![pkg("b"), pkg("a"), pkg("c")].into_iter().collect();
        let ids: Vec<&str> = catalog.ids().collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("a"));
        assert!(!catalog.contains("z"));
    }

    #[test]
    fn test_search() {
        let catalog: Catalog = vec![
            pkg("a").with_name("Deploy helper"),
            pkg("b").with_description("deploys things"),
            pkg("c").with_name("Writer"),
        ]
        .into_iter()
        .collect();

        let hits: Vec<&str> = catalog.search("DEPLOY").map(|p| p.id.as_str()).collect();
        assert_eq!(hits, vec!["a", "b"]);
        assert_eq!(catalog.search("").count(), 3);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let handle = CatalogHandle::new(vec![pkg("old")].into_iter().collect());
        let held = handle.snapshot();

        let previous = handle.replace(vec![pkg("new")].into_iter().collect());

        assert!(held.contains("old"));
        assert!(!held.contains("new"));
        assert!(Arc::ptr_eq(&held, &previous));
        assert!(handle.snapshot().contains("new"));
    }
}
