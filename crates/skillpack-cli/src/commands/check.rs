//! `skillpack check` command implementation.
//!
//! Cycles and unknown references are legal (resolution handles both), so
//! this reports them without failing.

use serde::Serialize;
use skillpack_core::error::SkillResult;
use skillpack_resolver::{CatalogGraph, MissingReference};

use super::CommandContext;

#[derive(Serialize)]
struct CheckReport<'a> {
    packages: usize,
    dependencies: usize,
    cycles: Vec<Vec<String>>,
    missing: &'a [MissingReference],
    /// Dependencies before dependents; absent when the catalog has a cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    install_order: Option<Vec<String>>,
}

/// Execute the `skillpack check` command
pub async fn execute(ctx: &CommandContext) -> SkillResult<()> {
    let catalog = ctx.catalog().await?;
    let graph = CatalogGraph::from_catalog(&catalog);

    let report = CheckReport {
        packages: graph.package_count(),
        dependencies: graph.dependency_count(),
        cycles: graph.cycles(),
        missing: graph.missing_references(),
        install_order: graph.install_order().ok(),
    };

    if ctx.output.is_json() {
        return ctx.output.json(&report);
    }

    ctx.output.info(&format!(
        "{} skill(s), {} resolvable dependency edge(s)",
        report.packages, report.dependencies
    ));

    for cycle in &report.cycles {
        ctx.output.warn(&format!("Dependency cycle: {}", CatalogGraph::format_cycle(cycle)));
    }
    for reference in report.missing {
        ctx.output.warn(&format!(
            "{} depends on unknown skill '{}'",
            reference.from, reference.missing
        ));
    }

    if let Some(order) = &report.install_order {
        ctx.output.field("Install order", &order.join(", "));
    }
    if report.cycles.is_empty() && report.missing.is_empty() {
        ctx.output.success("Catalog is consistent");
    }
    Ok(())
}
