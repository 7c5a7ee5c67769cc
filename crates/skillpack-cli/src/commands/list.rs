//! `skillpack list` command implementation.

use skillpack_core::error::SkillResult;
use skillpack_core::Package;

use super::CommandContext;

/// Execute the `skillpack list` command
pub async fn execute(keyword: Option<String>, ctx: &CommandContext) -> SkillResult<()> {
    let catalog = ctx.catalog().await?;
    let keyword = keyword.unwrap_or_default();
    let matches: Vec<&Package> = catalog.search(&keyword).collect();

    if ctx.output.is_json() {
        return ctx.output.json(&matches);
    }

    if matches.is_empty() {
        if keyword.is_empty() {
            ctx.output.info(&format!("No skills found in {}", ctx.hub.repo_dir().display()));
        } else {
            ctx.output.info(&format!("No skills match '{}'", keyword));
        }
        return Ok(());
    }

    let width = matches.iter().map(|pkg| pkg.id.len()).max().unwrap_or(0);
    for pkg in &matches {
        ctx.output.line(&format_row(pkg, width));
    }
    ctx.output.info(&format!("{} of {} skill(s)", matches.len(), catalog.len()));

    Ok(())
}

/// One listing row: padded id, description (or name), dependency count
pub fn format_row(pkg: &Package, width: usize) -> String {
    let summary = pkg
        .description
        .as_deref()
        .or(pkg.name.as_deref())
        .unwrap_or("");

    let mut row = format!("{:<width$}  {}", pkg.id, summary, width = width);
    if !pkg.dependencies.is_empty() {
        row.push_str(&format!(" (+{} deps)", pkg.dependencies.len()));
    }
    row.trim_end().to_string()
}
