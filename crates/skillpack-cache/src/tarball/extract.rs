//! Archive extraction
//!
//! Every entry path is checked before anything is written, so an archive
//! cannot place files outside the destination directory.

use flate2::read::GzDecoder;
use skillpack_core::error::SkillError;
use skillpack_core::utils::safe_join;
use std::fs;
use std::io::Read;
use std::path::Path;
use tar::{Archive, EntryType};
use tracing::debug;

use crate::CacheResult;

/// Extract a gzip tarball into `dest_dir` and return the number of files
/// written.
///
/// With `keep_existing`, files already present in the destination are left
/// untouched (the behaviour of `tar -k`).
pub fn extract_archive<R: Read>(reader: R, dest_dir: &Path, keep_existing: bool) -> CacheResult<usize> {
    let mut archive = Archive::new(GzDecoder::new(reader));

    fs::create_dir_all(dest_dir)
        .map_err(|e| SkillError::io(format!("Failed to create {}", dest_dir.display()), e))?;

    let entries = archive
        .entries()
        .map_err(|e| SkillError::io("Failed to read archive".to_string(), e))?;

    let mut written = 0;
    for entry in entries {
        let mut entry = entry.map_err(|e| SkillError::io("Corrupt archive entry".to_string(), e))?;
        let entry_path = entry
            .path()
            .map_err(|e| SkillError::io("Invalid archive entry path".to_string(), e))?
            .into_owned();
        let target = safe_join(dest_dir, &entry_path)?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)
                    .map_err(|e| SkillError::io(format!("Failed to create {}", target.display()), e))?;
            },
            EntryType::Regular => {
                if keep_existing && target.exists() {
                    debug!(path = %target.display(), "Keeping existing file");
                    continue;
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| SkillError::io(format!("Failed to create {}", parent.display()), e))?;
                }
                let mut file = fs::File::create(&target)
                    .map_err(|e| SkillError::io(format!("Failed to create {}", target.display()), e))?;
                std::io::copy(&mut entry, &mut file)
                    .map_err(|e| SkillError::io(format!("Failed to write {}", target.display()), e))?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Ok(mode) = entry.header().mode() {
                        let _ = fs::set_permissions(&target, fs::Permissions::from_mode(mode));
                    }
                }

                written += 1;
            },
            other => {
                debug!(path = %entry_path.display(), entry_type = ?other, "Skipping unsupported entry");
            },
        }
    }

    Ok(written)
}
