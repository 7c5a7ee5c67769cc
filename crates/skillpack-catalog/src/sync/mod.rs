//! Repository sync through the external `git` client
//!
//! The only thing the rest of the system needs from a sync is whether the
//! checkout materially changed, which decides if the archive cache is wiped.

use skillpack_core::error::SkillError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::CatalogResult;

/// Result of one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh clone into an empty location
    Cloned,
    /// Pull on an existing checkout
    Updated { changed: bool },
    /// No remote configured; the directory is used as-is
    Skipped,
}

impl SyncOutcome {
    /// Whether cached archives may now be stale
    pub fn catalog_changed(&self) -> bool {
        match self {
            SyncOutcome::Cloned => true,
            SyncOutcome::Updated { changed } => *changed,
            SyncOutcome::Skipped => false,
        }
    }
}

/// Clone-or-pull sync of a skill repository
#[derive(Debug, Clone)]
pub struct GitSync {
    url: Option<String>,
    dir: PathBuf,
    timeout: Duration,
}

impl GitSync {
    /// Default timeout for a single git invocation
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a sync for `dir`, cloning from `url` when it does not exist
    pub fn new(url: Option<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            url,
            dir: dir.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Local checkout directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Clone when the checkout is missing, otherwise pull
    pub async fn sync(&self) -> CatalogResult<SyncOutcome> {
        let Some(url) = self.url.as_deref() else {
            debug!(dir = %self.dir.display(), "No repository URL configured, skipping sync");
            return Ok(SyncOutcome::Skipped);
        };

        if self.dir.exists() {
            let stdout = self.run_git(&["pull"], &self.dir).await?;
            let changed = pull_reported_changes(&stdout);
            info!(dir = %self.dir.display(), changed, "Repository pulled");
            Ok(SyncOutcome::Updated { changed })
        } else {
            let parent = self
                .dir
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SkillError::io(format!("Failed to create {}", parent.display()), e))?;

            let target = self
                .dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| SkillError::Sync {
                    message: format!("{} has no folder name to clone into", self.dir.display()),
                })?;
            self.run_git(&["clone", url, &target], parent).await?;
            info!(dir = %self.dir.display(), "Repository cloned");
            Ok(SyncOutcome::Cloned)
        }
    }

    async fn run_git(&self, args: &[&str], cwd: &Path) -> CatalogResult<String> {
        debug!(?args, cwd = %cwd.display(), "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| SkillError::Sync {
                message: format!("git {} timed out after {}s", args.join(" "), self.timeout.as_secs()),
            })?
            .map_err(|e| SkillError::Sync {
                message: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            return Err(SkillError::Sync {
                message: format!(
                    "git {} failed: {}",
                    args.first().copied().unwrap_or_default(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Whether `git pull` output reports new commits
pub fn pull_reported_changes(stdout: &str) -> bool {
    !(stdout.contains("Already up to date") || stdout.contains("Already up-to-date"))
}
