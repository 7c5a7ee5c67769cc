//! Service state shared by every command.
//!
//! The hub owns the published catalog snapshot, the archive cache and the
//! repository sync. Commands read snapshots from it; only `rescan` and
//! `refresh` ever replace the catalog.

use camino::Utf8Path;
use serde::Serialize;
use skillpack_cache::{ArchiveCache, ArchiveLimits, ArchiveMember, CacheKey};
use skillpack_catalog::{scan_catalog, GitSync, SyncOutcome};
use skillpack_config::{ServerSection, SkillpackToml};
use skillpack_core::error::{SkillError, SkillResult};
use skillpack_core::{Catalog, CatalogHandle};
use skillpack_resolver::Resolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod plan;

pub use plan::DownloadPlan;

/// What one refresh run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub outcome: SyncOutcome,
    pub packages: usize,
    pub invalidated: bool,
}

/// An archive as handed to a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArchive {
    pub key: CacheKey,
    /// Location inside the cache directory
    pub path: PathBuf,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_to: Option<PathBuf>,
}

/// Catalog, cache and sync wired together
#[derive(Debug)]
pub struct SkillHub {
    repo_dir: PathBuf,
    catalog: CatalogHandle,
    cache: ArchiveCache,
    sync: GitSync,
    server: ServerSection,
}

impl SkillHub {
    /// Build a hub from configuration. Relative paths resolve against `base`.
    ///
    /// The catalog starts empty; call [`SkillHub::rescan`] or
    /// [`SkillHub::refresh`] to populate it.
    pub fn new(config: &SkillpackToml, base: &Utf8Path) -> Self {
        let repo_dir = config.repository_dir(base).into_std_path_buf();
        let cache_dir = config.cache_dir(base).into_std_path_buf();
        let limits = ArchiveLimits::new(config.cache.max_archive_bytes, config.build_timeout());

        Self {
            sync: GitSync::new(config.repository.url.clone(), repo_dir.clone()),
            repo_dir,
            catalog: CatalogHandle::default(),
            cache: ArchiveCache::new(cache_dir, limits),
            server: config.server.clone(),
        }
    }

    /// Skill repository directory
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Archive cache
    pub fn cache(&self) -> &ArchiveCache {
        &self.cache
    }

    /// Download surface settings
    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    /// Current catalog snapshot
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    /// Resolver bound to the current snapshot
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.snapshot())
    }

    /// Rescan the repository and publish the result
    pub async fn rescan(&self) -> SkillResult<Arc<Catalog>> {
        let root = self.repo_dir.clone();
        let catalog = tokio::task::spawn_blocking(move || scan_catalog(&root))
            .await
            .map_err(|e| SkillError::Io {
                message: "Catalog scan task failed".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })??;

        self.catalog.replace(catalog);
        Ok(self.snapshot())
    }

    /// Sync the repository, rescan, and wipe the archive cache if the
    /// checkout changed.
    pub async fn refresh(&self) -> SkillResult<RefreshReport> {
        let outcome = self.sync.sync().await?;
        let catalog = self.rescan().await?;

        let invalidated = outcome.catalog_changed();
        if invalidated {
            self.cache.invalidate()?;
        }

        info!(?outcome, packages = catalog.len(), invalidated, "Refresh complete");
        Ok(RefreshReport {
            outcome,
            packages: catalog.len(),
            invalidated,
        })
    }

    /// Path to the archive for `key`, building it on first request.
    pub async fn archive(self: Arc<Self>, key: CacheKey) -> SkillResult<PathBuf> {
        Ok(self.export(key, None).await?.path)
    }

    /// Build (or reuse) the archive for `key`, stat it and optionally copy
    /// it to `copy_to`, all before a concurrent invalidation can remove it.
    ///
    /// Runs on the blocking pool. Archive members come from the snapshot
    /// current when the build starts, not when this is called.
    pub async fn export(self: Arc<Self>, key: CacheKey, copy_to: Option<PathBuf>) -> SkillResult<ExportedArchive> {
        tokio::task::spawn_blocking(move || {
            self.cache.with_archive(
                &key,
                || self.members(&key),
                |path| {
                    let size = std::fs::metadata(path)
                        .map_err(|e| SkillError::io(format!("Failed to stat {}", path.display()), e))?
                        .len();
                    if let Some(target) = &copy_to {
                        std::fs::copy(path, target).map_err(|e| {
                            SkillError::io(format!("Failed to copy archive to {}", target.display()), e)
                        })?;
                    }
                    Ok(ExportedArchive {
                        key: key.clone(),
                        path: path.to_path_buf(),
                        size,
                        copied_to: copy_to.clone(),
                    })
                },
            )
        })
        .await
        .map_err(|e| SkillError::Io {
            message: "Archive build task failed".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?
    }

    /// Archive members for `key` against the current snapshot
    fn members(&self, key: &CacheKey) -> SkillResult<Vec<ArchiveMember>> {
        members_for(&self.snapshot(), key)
    }

    /// Download plan for a skill and its dependencies
    pub fn download_plan(&self, id: &str) -> SkillResult<DownloadPlan> {
        let skills = self.resolver().install_set(id)?;
        Ok(DownloadPlan::for_skill(&self.server, id, skills))
    }

    /// Download plan for the whole catalog
    pub fn download_plan_all(&self) -> DownloadPlan {
        let skills = self.snapshot().ids().map(str::to_string).collect();
        DownloadPlan::for_all(&self.server, skills)
    }
}

/// Archive contents for `key` against `catalog`.
///
/// Packages whose folder has disappeared since the scan are left out of
/// bundles; a single-package request for one fails instead.
pub fn members_for(catalog: &Arc<Catalog>, key: &CacheKey) -> SkillResult<Vec<ArchiveMember>> {
    let ids: Vec<String> = match key {
        CacheKey::WithDeps(id) => Resolver::new(Arc::clone(catalog)).install_set(id)?,
        CacheKey::All => catalog.ids().map(str::to_string).collect(),
        CacheKey::Single(id) => {
            let package = catalog.get(id).ok_or_else(|| SkillError::not_found(id))?;
            if !package.source_dir.is_dir() {
                return Err(SkillError::CacheBuild {
                    key: key.stem(),
                    message: format!("{} does not exist", package.source_dir.display()),
                    source: None,
                });
            }
            vec![id.clone()]
        },
    };

    let members: Vec<ArchiveMember> = ids
        .iter()
        .filter_map(|id| catalog.get(id))
        .filter(|package| {
            let present = package.source_dir.is_dir();
            if !present {
                warn!(skill = %package.id, "Skill folder vanished, leaving it out of the archive");
            }
            present
        })
        .map(|package| ArchiveMember::new(package.id.clone(), package.source_dir.clone()))
        .collect();

    debug!(key = %key, members = members.len(), "Selected archive members");
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillpack_cache::extract_archive;
    use std::fs;
    use std::process::Command;
    use std::sync::{Barrier, Mutex};
    use tempfile::{tempdir, TempDir};

    fn write_skill(root: &Path, id: &str, content: &str) {
        fs::create_dir_all(root.join(id)).unwrap();
        fs::write(root.join(id).join("skill.md"), content).unwrap();
    }

    fn hub_in(temp: &TempDir) -> SkillHub {
        let skills = temp.path().join("skills");
        write_skill(&skills, "devops-flow", "---\nname: DevOps\ndependencies: [writing-plans]\n---\n");
        write_skill(&skills, "writing-plans", "name: Plans\nUse <skill>tdd</skill>\n");
        write_skill(&skills, "tdd", "name: TDD\n");
        write_skill(&skills, "standalone", "name: Alone\n");

        let base = Utf8Path::from_path(temp.path()).unwrap();
        SkillHub::new(&SkillpackToml::default(), base)
    }

    #[tokio::test]
    async fn test_rescan_publishes_catalog() {
        let temp = tempdir().unwrap();
        let hub = hub_in(&temp);
        assert!(hub.snapshot().is_empty());

        let catalog = hub.rescan().await.unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(hub.snapshot().len(), 4);
    }

    #[tokio::test]
    async fn test_refresh_without_remote_keeps_cache() {
        let temp = tempdir().unwrap();
        let hub = Arc::new(hub_in(&temp));
        hub.rescan().await.unwrap();
        let path = hub.clone().archive(CacheKey::All).await.unwrap();

        let report = hub.refresh().await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Skipped);
        assert!(!report.invalidated);
        assert_eq!(report.packages, 4);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_with_deps_members_follow_resolution() {
        let temp = tempdir().unwrap();
        let hub = hub_in(&temp);
        let catalog = hub.rescan().await.unwrap();

        let members = members_for(&catalog, &CacheKey::WithDeps("devops-flow".into())).unwrap();
        let ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["devops-flow", "writing-plans", "tdd"]);
    }

    #[tokio::test]
    async fn test_members_for_unknown_and_vanished() {
        let temp = tempdir().unwrap();
        let hub = hub_in(&temp);
        let catalog = hub.rescan().await.unwrap();

        assert!(matches!(
            members_for(&catalog, &CacheKey::WithDeps("nope".into())),
            Err(SkillError::PackageNotFound { .. })
        ));

        fs::remove_dir_all(hub.repo_dir().join("tdd")).unwrap();
        let members = members_for(&catalog, &CacheKey::WithDeps("devops-flow".into())).unwrap();
        assert_eq!(members.len(), 2);
        assert!(matches!(
            members_for(&catalog, &CacheKey::Single("tdd".into())),
            Err(SkillError::CacheBuild { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_members_cover_catalog() {
        let temp = tempdir().unwrap();
        let hub = hub_in(&temp);
        let catalog = hub.rescan().await.unwrap();

        let members = members_for(&catalog, &CacheKey::All).unwrap();
        assert_eq!(members.len(), catalog.len());
    }

    #[tokio::test]
    async fn test_archive_is_written_to_cache_dir() {
        let temp = tempdir().unwrap();
        let hub = Arc::new(hub_in(&temp));
        hub.rescan().await.unwrap();

        let path = hub.clone().archive(CacheKey::WithDeps("devops-flow".into())).await.unwrap();
        assert_eq!(path, temp.path().join("skills/.skill-cache/devops-flow-with-deps.tar.gz"));
        assert!(path.is_file());
    }

    fn archived_ids(path: &Path, scratch: &Path) -> Vec<String> {
        extract_archive(fs::File::open(path).unwrap(), scratch, false).unwrap();
        let mut ids: Vec<String> = fs::read_dir(scratch)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_build_racing_refresh_uses_new_snapshot() {
        let temp = tempdir().unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let hub = hub_in(&temp);
        rt.block_on(hub.rescan()).unwrap();

        let key = CacheKey::WithDeps("standalone".into());
        let provider_started = Barrier::new(2);
        let resume = Barrier::new(2);
        let seen = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            let builder = scope.spawn(|| {
                hub.cache().get_or_build(&key, || {
                    provider_started.wait();
                    resume.wait();
                    let members = hub.members(&key)?;
                    *seen.lock().unwrap() = members.iter().map(|m| m.id.clone()).collect();
                    Ok(members)
                })
            });

            // The catalog changes and is invalidated while the build is in flight
            provider_started.wait();
            write_skill(hub.repo_dir(), "standalone", "---\ndependencies: [tdd]\n---\n");
            rt.block_on(hub.rescan()).unwrap();
            let wiper = scope.spawn(|| hub.cache().invalidate());
            resume.wait();

            builder.join().unwrap().unwrap();
            wiper.join().unwrap().unwrap();
        });

        // The in-flight build already saw the rescanned catalog
        assert_eq!(*seen.lock().unwrap(), vec!["standalone", "tdd"]);

        let hub = Arc::new(hub);
        let path = rt.block_on(hub.clone().archive(key)).unwrap();
        assert_eq!(archived_ids(&path, &temp.path().join("out")), vec!["standalone", "tdd"]);
    }

    #[tokio::test]
    async fn test_archive_after_rescan_and_invalidate_is_fresh() {
        let temp = tempdir().unwrap();
        let hub = Arc::new(hub_in(&temp));
        hub.rescan().await.unwrap();

        let key = CacheKey::WithDeps("standalone".into());
        let before = hub.clone().archive(key.clone()).await.unwrap();
        assert_eq!(archived_ids(&before, &temp.path().join("before")), vec!["standalone"]);

        write_skill(hub.repo_dir(), "standalone", "---\ndependencies: [tdd]\n---\n");
        hub.rescan().await.unwrap();
        hub.cache().invalidate().unwrap();

        let after = hub.clone().archive(key).await.unwrap();
        assert_eq!(archived_ids(&after, &temp.path().join("after")), vec!["standalone", "tdd"]);
    }

    #[tokio::test]
    async fn test_export_reports_size_and_copies() {
        let temp = tempdir().unwrap();
        let hub = Arc::new(hub_in(&temp));
        hub.rescan().await.unwrap();

        let target = temp.path().join("bundle.tar.gz");
        let exported = hub
            .clone()
            .export(CacheKey::WithDeps("devops-flow".into()), Some(target.clone()))
            .await
            .unwrap();

        assert_eq!(exported.size, fs::metadata(&exported.path).unwrap().len());
        assert_eq!(exported.copied_to.as_deref(), Some(target.as_path()));
        assert_eq!(fs::read(&target).unwrap(), fs::read(&exported.path).unwrap());
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=skillpack", "-c", "user.email=skillpack@example.com"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    #[tokio::test]
    async fn test_refresh_invalidates_only_on_change() {
        let temp = tempdir().unwrap();
        let origin = temp.path().join("origin");
        write_skill(&origin, "tdd", "name: TDD\n");
        write_skill(&origin, "writing-plans", "name: Plans\nUse <skill>tdd</skill>\n");
        git(&origin, &["init", "--quiet"]);
        git(&origin, &["add", "."]);
        git(&origin, &["commit", "--quiet", "-m", "initial"]);

        let mut config = SkillpackToml::default();
        config.repository.url = Some(origin.to_string_lossy().into_owned());
        config.repository.dir = "checkout".into();
        let base = Utf8Path::from_path(temp.path()).unwrap();
        let hub = Arc::new(SkillHub::new(&config, base));

        let first = hub.refresh().await.unwrap();
        assert_eq!(first.outcome, SyncOutcome::Cloned);
        assert!(first.invalidated);
        assert_eq!(first.packages, 2);

        let path = hub.clone().archive(CacheKey::All).await.unwrap();

        let unchanged = hub.refresh().await.unwrap();
        assert_eq!(unchanged.outcome, SyncOutcome::Updated { changed: false });
        assert!(!unchanged.invalidated);
        assert!(path.is_file());

        write_skill(&origin, "code-review", "name: Review\n");
        git(&origin, &["add", "."]);
        git(&origin, &["commit", "--quiet", "-m", "add code-review"]);

        let changed = hub.refresh().await.unwrap();
        assert_eq!(changed.outcome, SyncOutcome::Updated { changed: true });
        assert!(changed.invalidated);
        assert_eq!(changed.packages, 3);
        assert!(!path.exists());
    }
}
