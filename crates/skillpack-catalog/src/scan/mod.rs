//! Catalog scanning
//!
//! Every immediate subdirectory of the repository that holds a `skill.md`
//! (any letter case) becomes one package. A descriptor that cannot be read
//! costs that package its metadata, never the whole scan.

use rayon::prelude::*;
use skillpack_core::error::SkillError;
use skillpack_core::utils::is_hidden;
use skillpack_core::{Catalog, Package};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::descriptor::{read_descriptor, DESCRIPTOR_FILE_NAME};
use crate::CatalogResult;

/// Build a catalog from the package folders under `root`.
///
/// A missing `root` yields an empty catalog.
pub fn scan_catalog(root: &Path) -> CatalogResult<Catalog> {
    if !root.exists() {
        debug!(root = %root.display(), "Skill repository does not exist yet");
        return Ok(Catalog::new());
    }

    let entries = fs::read_dir(root)
        .map_err(|e| SkillError::io(format!("Failed to list {}", root.display()), e))?;

    let mut candidates: Vec<(String, PathBuf, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            },
        };
        let dir = entry.path();
        if !dir.is_dir() || is_hidden(&dir) {
            continue;
        }
        let Some(id) = entry.file_name().to_str().map(str::to_string) else {
            warn!(dir = %dir.display(), "Skipping folder with a non UTF-8 name");
            continue;
        };
        if let Some(descriptor) = find_descriptor(&dir) {
            candidates.push((id, dir, descriptor));
        }
    }

    let packages: Vec<Package> = candidates
        .into_par_iter()
        .map(|(id, dir, descriptor_path)| load_package(id, dir, &descriptor_path))
        .collect();

    let with_deps = packages.iter().filter(|p| !p.dependencies.is_empty()).count();
    info!(
        packages = packages.len(),
        with_dependencies = with_deps,
        "Scanned skill catalog"
    );

    Ok(packages.into_iter().collect())
}

/// Locate the descriptor file in a package folder (case-insensitive)
pub fn find_descriptor(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.eq_ignore_ascii_case(DESCRIPTOR_FILE_NAME))
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn load_package(id: String, dir: PathBuf, descriptor_path: &Path) -> Package {
    let mut package = Package::new(id, dir);

    match read_descriptor(descriptor_path) {
        Ok(descriptor) => {
            package.name = descriptor.name;
            package.description = descriptor.description;
            package.dependencies = descriptor.dependencies.into_iter().collect();
            if !package.dependencies.is_empty() {
                debug!(skill = %package.id, count = package.dependencies.len(), "Declared dependencies");
            }
        },
        Err(e) => {
            warn!(skill = %package.id, error = %e, "Descriptor unreadable, keeping skill without metadata");
        },
    }

    package
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_skill(root: &Path, id: &str, file_name: &str, content: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file_name), content).unwrap();
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp_dir = tempdir().unwrap();
        let catalog = scan_catalog(&temp_dir.path().join("nope")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_scan_collects_packages() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_skill(
            root,
            "devops-flow",
            "SKILL.md",
            "---\nname: DevOps Flow\ndescription: Ship\ndependencies: [writing-plans]\n---\nUse <skill>tdd</skill>\n",
        );
        write_skill(root, "writing-plans", "skill.md", "name: Writing Plans\n");
        write_skill(root, "no-descriptor", "README.md", "name: ignored\n");
        write_skill(root, ".git", "skill.md", "name: hidden\n");
        fs::write(root.join("loose-file.md"), "not a package").unwrap();

        let catalog = scan_catalog(root).unwrap();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids, vec!["devops-flow", "writing-plans"]);

        let devops = catalog.get("devops-flow").unwrap();
        assert_eq!(devops.name.as_deref(), Some("DevOps Flow"));
        assert_eq!(devops.source_dir, root.join("devops-flow"));
        let deps: Vec<&str> = devops.dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["tdd", "writing-plans"]);
    }

    #[test]
    fn test_descriptor_lookup_is_case_insensitive() {
        let temp_dir = tempdir().unwrap();
        write_skill(temp_dir.path(), "a", "Skill.MD", "name: A\n");

        let found = find_descriptor(&temp_dir.path().join("a")).unwrap();
        assert_eq!(found.file_name().unwrap(), "Skill.MD");
    }

    #[test]
    fn test_unreadable_descriptor_keeps_package() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let dir = root.join("broken");
        fs::create_dir_all(&dir).unwrap();
        // Invalid UTF-8 makes read_to_string fail
        fs::write(dir.join("skill.md"), [0xffu8, 0xfe, 0xfd]).unwrap();
        write_skill(root, "fine", "skill.md", "name: Fine\n");

        let catalog = scan_catalog(root).unwrap();
        assert_eq!(catalog.len(), 2);

        let broken = catalog.get("broken").unwrap();
        assert_eq!(broken.name, None);
        assert!(broken.dependencies.is_empty());
        assert_eq!(catalog.get("fine").unwrap().name.as_deref(), Some("Fine"));
    }
}
