//! `skillpack info` command implementation.
//!
//! Shows a skill's metadata, what it pulls in, who depends on it, and the
//! download plan for installing it with its dependencies.

use serde::Serialize;
use skillpack_core::error::SkillResult;
use skillpack_core::Package;
use skillpack_resolver::CatalogGraph;

use super::CommandContext;
use crate::hub::DownloadPlan;

#[derive(Serialize)]
struct InfoReport<'a> {
    skill: &'a Package,
    transitive: Vec<String>,
    missing: Vec<&'a str>,
    dependents: Vec<String>,
    plan: DownloadPlan,
}

/// Execute the `skillpack info` command
pub async fn execute(id: String, ctx: &CommandContext) -> SkillResult<()> {
    let catalog = ctx.catalog().await?;

    if id == "all" && !catalog.contains(&id) {
        let plan = ctx.hub.download_plan_all();
        if ctx.output.is_json() {
            return ctx.output.json(&plan);
        }
        ctx.output.field("Skills", &plan.skills.len().to_string());
        print_plan(&plan, ctx);
        return Ok(());
    }

    let skill = ctx.require_skill(&catalog, &id)?;

    let resolver = ctx.hub.resolver();
    let tree = resolver.tree(&id);
    let report = InfoReport {
        skill,
        transitive: resolver.flatten(&id),
        missing: tree.missing_ids(),
        dependents: CatalogGraph::from_catalog(&catalog).dependents(&id),
        plan: ctx.hub.download_plan(&id)?,
    };

    if ctx.output.is_json() {
        return ctx.output.json(&report);
    }

    ctx.output.field("Skill", &skill.id);
    if let Some(name) = &skill.name {
        ctx.output.field("Name", name);
    }
    if let Some(description) = &skill.description {
        ctx.output.field("Description", description);
    }
    ctx.output.field("Location", &skill.source_dir.display().to_string());
    ctx.output.field("Dependencies", &join_or_none(skill.dependencies.iter()));
    ctx.output.field("All dependencies", &join_or_none(report.transitive.iter()));
    ctx.output.field("Used by", &join_or_none(report.dependents.iter()));
    if !report.missing.is_empty() {
        ctx.output.warn(&format!("Unknown dependencies: {}", report.missing.join(", ")));
    }
    print_plan(&report.plan, ctx);

    Ok(())
}

fn print_plan(plan: &DownloadPlan, ctx: &CommandContext) {
    ctx.output.line("");
    ctx.output.field("Download", &plan.download_url);
    ctx.output.field("Includes", &plan.skills.join(", "));
    ctx.output.field("Install", &plan.instruction);
}

fn join_or_none<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.map(String::as_str).collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
