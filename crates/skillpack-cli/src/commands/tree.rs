//! `skillpack tree` and `skillpack deps` command implementations.

use skillpack_core::error::SkillResult;
use skillpack_resolver::render;

use super::CommandContext;

/// Execute the `skillpack tree` command.
///
/// An unknown root is not an error here: it renders as a single
/// `[missing]` line, like any other missing reference.
pub async fn execute_tree(id: String, ctx: &CommandContext) -> SkillResult<()> {
    ctx.catalog().await?;
    let tree = ctx.hub.resolver().tree(&id);

    if ctx.output.is_json() {
        return ctx.output.json(&tree);
    }

    ctx.output.line(&render(&tree));
    if tree.has_cycle() {
        ctx.output.info("[circular] marks a skill that already appears above it");
    }
    Ok(())
}

/// Execute the `skillpack deps` command
pub async fn execute_deps(id: String, ctx: &CommandContext) -> SkillResult<()> {
    let catalog = ctx.catalog().await?;
    ctx.require_skill(&catalog, &id)?;

    let deps = ctx.hub.resolver().flatten(&id);

    if ctx.output.is_json() {
        return ctx.output.json(&deps);
    }

    if deps.is_empty() {
        ctx.output.info(&format!("{} has no dependencies", id));
        return Ok(());
    }
    for dep in &deps {
        ctx.output.line(dep);
    }
    Ok(())
}
