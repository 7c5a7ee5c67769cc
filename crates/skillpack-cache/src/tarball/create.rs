//! Archive creation with size and time ceilings

use flate2::write::GzEncoder;
use flate2::Compression;
use skillpack_core::error::SkillError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tar::{Builder, HeaderMode};
use tracing::debug;
use walkdir::WalkDir;

use crate::store::{ArchiveLimits, ArchiveMember};
use crate::CacheResult;

/// What went into a finished archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Packages added
    pub members: usize,
    /// Regular files added
    pub files: usize,
    /// Uncompressed bytes of file content
    pub bytes: u64,
}

/// Write a gzip tarball of `members` into `writer` and return the writer.
///
/// Each member's source folder is added recursively under its id. Repeated
/// ids are added once. Symlinks and special files are skipped.
pub fn create_archive<W: Write>(
    writer: W,
    key: &str,
    members: &[ArchiveMember],
    limits: &ArchiveLimits,
) -> CacheResult<(W, ArchiveSummary)> {
    let started = Instant::now();
    let mut builder = Builder::new(GzEncoder::new(writer, Compression::default()));
    builder.mode(HeaderMode::Deterministic);
    builder.follow_symlinks(false);

    let mut summary = ArchiveSummary::default();
    let mut seen = HashSet::new();

    for member in members {
        if !seen.insert(member.id.as_str()) {
            continue;
        }
        append_member(&mut builder, key, member, limits, started, &mut summary)?;
        summary.members += 1;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| SkillError::cache_build(key, "Failed to finish tar stream", e))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| SkillError::cache_build(key, "Failed to finish gzip stream", e))?;
    writer
        .flush()
        .map_err(|e| SkillError::cache_build(key, "Failed to flush archive", e))?;

    Ok((writer, summary))
}

fn append_member<W: Write>(
    builder: &mut Builder<W>,
    key: &str,
    member: &ArchiveMember,
    limits: &ArchiveLimits,
    started: Instant,
    summary: &mut ArchiveSummary,
) -> CacheResult<()> {
    debug!(key, skill = %member.id, source = %member.source_dir.display(), "Adding archive member");

    for entry in WalkDir::new(&member.source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            SkillError::cache_build(key, format!("Failed to walk {}", member.source_dir.display()), e.into())
        })?;

        if started.elapsed() >= limits.max_duration {
            return Err(SkillError::ArchiveLimit {
                key: key.to_string(),
                reason: format!("build took longer than {}s", limits.max_duration.as_secs()),
            });
        }

        let path = entry.path();
        let relative = path.strip_prefix(&member.source_dir).unwrap_or(Path::new(""));
        let name = Path::new(&member.id).join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            builder
                .append_dir(&name, path)
                .map_err(|e| SkillError::cache_build(key, format!("Failed to add {}", name.display()), e))?;
        } else if file_type.is_file() {
            let len = entry
                .metadata()
                .map_err(|e| SkillError::cache_build(key, format!("Failed to stat {}", path.display()), e.into()))?
                .len();
            summary.bytes += len;
            if summary.bytes > limits.max_bytes {
                return Err(SkillError::ArchiveLimit {
                    key: key.to_string(),
                    reason: format!("content exceeds {} bytes", limits.max_bytes),
                });
            }
            builder
                .append_path_with_name(path, &name)
                .map_err(|e| SkillError::cache_build(key, format!("Failed to add {}", name.display()), e))?;
            summary.files += 1;
        }
        // Symlinks and special files are not shipped
    }

    Ok(())
}
