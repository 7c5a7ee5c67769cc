//! `skillpack pack` and `skillpack unpack` command implementations.

use skillpack_cache::{extract_archive, CacheKey};
use skillpack_core::error::{SkillError, SkillResult};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use super::{absolutize, CommandContext};

/// Execute the `skillpack pack` command
pub async fn execute_pack(key: String, output: Option<PathBuf>, ctx: &CommandContext) -> SkillResult<()> {
    let key = CacheKey::parse(&key)?;
    let catalog = ctx.catalog().await?;
    if let Some(id) = key.package_id() {
        ctx.require_skill(&catalog, id)?;
    }

    let start_time = Instant::now();
    let copy_to = output.map(|target| absolutize(&ctx.cwd, &target));
    let report = ctx.hub.clone().export(key, copy_to).await?;

    if ctx.output.is_json() {
        return ctx.output.json(&report);
    }

    ctx.output.success(&format!(
        "{} ready ({} bytes) in {:.2}s",
        report.key.file_name(),
        report.size,
        start_time.elapsed().as_secs_f64()
    ));
    ctx.output.line(&report.path.display().to_string());
    if let Some(target) = &report.copied_to {
        ctx.output.info(&format!("Copied to {}", target.display()));
    }
    Ok(())
}

/// Execute the `skillpack unpack` command
pub async fn execute_unpack(
    archive: PathBuf,
    dest: PathBuf,
    overwrite: bool,
    ctx: &CommandContext,
) -> SkillResult<()> {
    let archive = absolutize(&ctx.cwd, &archive);
    let dest = absolutize(&ctx.cwd, &dest);

    let task_dest = dest.clone();
    let written = tokio::task::spawn_blocking(move || {
        let file = File::open(&archive)
            .map_err(|e| SkillError::io(format!("Failed to open {}", archive.display()), e))?;
        extract_archive(file, &task_dest, !overwrite)
    })
    .await
    .map_err(|e| SkillError::Io {
        message: "Extraction task failed".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e),
    })??;

    if ctx.output.is_json() {
        return ctx.output.json(&serde_json::json!({
            "dest": dest,
            "files_written": written,
        }));
    }
    ctx.output.success(&format!("Extracted {} file(s) into {}", written, dest.display()));
    Ok(())
}
