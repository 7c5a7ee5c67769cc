//! `skillpack sync` and `skillpack watch` command implementations.

use skillpack_catalog::SyncOutcome;
use skillpack_core::error::SkillResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::CommandContext;
use crate::hub::RefreshReport;

/// Execute the `skillpack sync` command
pub async fn execute_sync(ctx: &CommandContext) -> SkillResult<()> {
    let report = ctx.hub.refresh().await?;

    if ctx.output.is_json() {
        return ctx.output.json(&serde_json::json!({
            "outcome": outcome_label(&report.outcome),
            "packages": report.packages,
            "cache_invalidated": report.invalidated,
        }));
    }
    ctx.output.success(&describe(&report));
    Ok(())
}

/// Execute the `skillpack watch` command.
///
/// A failed refresh is reported and retried on the next tick; the loop ends
/// on Ctrl-C or after `runs` refreshes.
pub async fn execute_watch(interval: Option<u64>, runs: Option<usize>, ctx: &CommandContext) -> SkillResult<()> {
    let completed = watch_until(interval, runs, tokio::signal::ctrl_c(), ctx).await?;
    debug!(completed, "Watch finished");
    Ok(())
}

/// Refresh loop behind `watch`, stopping when `shutdown` resolves.
///
/// `shutdown` is polled while waiting for a tick and while a refresh is
/// running, so a long `git pull` does not swallow it. Returns the number of
/// refreshes that ran to completion.
pub async fn watch_until<S>(
    interval: Option<u64>,
    runs: Option<usize>,
    shutdown: S,
    ctx: &CommandContext,
) -> SkillResult<usize>
where
    S: Future,
{
    let period = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.refresh_interval())
        .max(Duration::from_millis(1));

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    ctx.output.info(&format!(
        "Refreshing {} every {}s (Ctrl-C to stop)",
        ctx.hub.repo_dir().display(),
        period.as_secs()
    ));

    let mut completed = 0usize;
    while runs.map_or(true, |limit| completed < limit) {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted, stopping watch");
                break;
            }
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted during refresh, stopping watch");
                break;
            }
            result = ctx.hub.refresh() => result,
        };

        match result {
            Ok(report) => ctx.output.success(&describe(&report)),
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping current catalog");
                ctx.output.warn(&format!("Refresh failed: {}", e));
            },
        }
        completed += 1;
    }

    Ok(completed)
}

fn outcome_label(outcome: &SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Cloned => "cloned",
        SyncOutcome::Updated { changed: true } => "updated",
        SyncOutcome::Updated { changed: false } => "unchanged",
        SyncOutcome::Skipped => "skipped",
    }
}

fn describe(report: &RefreshReport) -> String {
    let cache = if report.invalidated { ", archive cache cleared" } else { "" };
    format!(
        "Repository {}: {} skill(s){}",
        outcome_label(&report.outcome),
        report.packages,
        cache
    )
}
