//! On-disk archive store
//!
//! Archives are built lazily, once per key, and published with an atomic
//! rename so readers only ever see complete files. Invalidation removes the
//! whole directory; entries are never evicted one by one.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use skillpack_core::error::{SkillError, SkillResult};
use std::fs;
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::key::CacheKey;
use crate::tarball::create_archive;
use crate::{CacheResult, ARCHIVE_EXTENSION};

/// One package folder to place in an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Top-level folder name inside the archive
    pub id: String,
    /// Folder whose contents are added
    pub source_dir: PathBuf,
}

impl ArchiveMember {
    /// Create a member
    pub fn new(id: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source_dir: source_dir.into(),
        }
    }
}

/// Ceilings applied to a single archive build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Uncompressed file bytes
    pub max_bytes: u64,
    /// Wall-clock build time
    pub max_duration: Duration,
}

impl ArchiveLimits {
    /// Create limits
    pub fn new(max_bytes: u64, max_duration: Duration) -> Self {
        Self {
            max_bytes,
            max_duration,
        }
    }
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_bytes: 512 * 1024 * 1024,
            max_duration: Duration::from_secs(120),
        }
    }
}

/// A finished archive on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Key stem, e.g. `devops-flow-with-deps`
    pub key: String,
    /// Archive location
    pub path: PathBuf,
    /// Compressed size in bytes
    pub size: u64,
    /// When the archive was written
    pub built_at: DateTime<Utc>,
}

/// Build-once archive cache rooted at one directory
#[derive(Debug)]
pub struct ArchiveCache {
    dir: PathBuf,
    limits: ArchiveLimits,
    /// Serializes builds of the same key
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    /// Builds hold the read side, invalidation the write side
    generation: RwLock<()>,
}

impl ArchiveCache {
    /// Create a cache in `dir`. Nothing is created on disk until the first
    /// build.
    pub fn new(dir: impl Into<PathBuf>, limits: ArchiveLimits) -> Self {
        Self {
            dir: dir.into(),
            limits,
            key_locks: DashMap::new(),
            generation: RwLock::new(()),
        }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Limits applied to builds
    pub fn limits(&self) -> &ArchiveLimits {
        &self.limits
    }

    /// Final location of the archive for `key`, whether or not it exists
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Return the archive for `key`, building it from `provider` if absent.
    ///
    /// The provider runs at most once per key between invalidations, even
    /// under concurrent callers. A failed build leaves nothing at the final
    /// path.
    ///
    /// The returned path can be removed by a later [`ArchiveCache::invalidate`];
    /// use [`ArchiveCache::with_archive`] to read the file safely.
    pub fn get_or_build<F>(&self, key: &CacheKey, provider: F) -> CacheResult<PathBuf>
    where
        F: FnOnce() -> SkillResult<Vec<ArchiveMember>>,
    {
        self.with_archive(key, provider, |path| Ok(path.to_path_buf()))
    }

    /// Like [`ArchiveCache::get_or_build`], then run `use_archive` on the
    /// archive before any invalidation can remove it.
    ///
    /// The provider also runs inside that window, so an invalidation either
    /// happens before it starts or wipes what it built.
    pub fn with_archive<F, U, T>(&self, key: &CacheKey, provider: F, use_archive: U) -> CacheResult<T>
    where
        F: FnOnce() -> SkillResult<Vec<ArchiveMember>>,
        U: FnOnce(&Path) -> CacheResult<T>,
    {
        let _generation = self.generation.read();
        let final_path = self.ensure_built(key, provider)?;
        use_archive(&final_path)
    }

    /// Build `key` unless it is already on disk. Caller holds the generation
    /// read lock.
    fn ensure_built<F>(&self, key: &CacheKey, provider: F) -> CacheResult<PathBuf>
    where
        F: FnOnce() -> SkillResult<Vec<ArchiveMember>>,
    {
        let final_path = self.path_for(key);
        if final_path.is_file() {
            debug!(key = %key, "Archive cache hit");
            return Ok(final_path);
        }

        let stem = key.stem();
        let lock = self
            .key_locks
            .entry(stem.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        // Another caller may have finished the build while we waited
        if final_path.is_file() {
            debug!(key = %key, "Archive built by concurrent request");
            return Ok(final_path);
        }

        let members = provider()?;
        let started = Instant::now();
        self.build(&stem, &members, &final_path)?;

        info!(
            key = %key,
            members = members.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Archive built"
        );
        Ok(final_path)
    }

    fn build(&self, stem: &str, members: &[ArchiveMember], final_path: &Path) -> CacheResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| SkillError::cache_build(stem, format!("Failed to create {}", self.dir.display()), e))?;

        let temp = tempfile::Builder::new()
            .prefix(".building-")
            .suffix(ARCHIVE_EXTENSION)
            .tempfile_in(&self.dir)
            .map_err(|e| SkillError::cache_build(stem, "Failed to create temporary archive", e))?;

        // Dropping `temp` on any error below removes the partial file
        let (writer, summary) = create_archive(BufWriter::new(temp), stem, members, &self.limits)?;
        let temp = writer
            .into_inner()
            .map_err(|e| SkillError::cache_build(stem, "Failed to flush archive", e.into_error()))?;

        temp.persist(final_path)
            .map_err(|e| SkillError::cache_build(stem, "Failed to publish archive", e.error))?;

        debug!(key = stem, files = summary.files, bytes = summary.bytes, "Archive published");
        Ok(())
    }

    /// Remove every cached archive. A missing directory is not an error.
    pub fn invalidate(&self) -> CacheResult<()> {
        let _generation = self.generation.write();

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => info!(dir = %self.dir.display(), "Archive cache invalidated"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Archive cache already empty");
            },
            Err(e) => {
                return Err(SkillError::io(format!("Failed to remove {}", self.dir.display()), e));
            },
        }

        self.key_locks.clear();
        Ok(())
    }

    /// Archives currently on disk, sorted by key
    pub fn entries(&self) -> CacheResult<Vec<CacheEntry>> {
        let _generation = self.generation.read();

        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SkillError::io(format!("Failed to list {}", self.dir.display()), e)),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir.filter_map(Result::ok) {
            let path = dir_entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            let Some(key) = file_name.strip_suffix(ARCHIVE_EXTENSION) else {
                continue;
            };
            let Ok(metadata) = dir_entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let built_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            entries.push(CacheEntry {
                key: key.to_string(),
                path: path.clone(),
                size: metadata.len(),
                built_at,
            });
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
