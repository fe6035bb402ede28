//! `modstrap install` - resolve, plan, and install a selection

use anyhow::{Context as AnyhowContext, Result};
use chrono::Utc;
use manifest::{Manifest, Selection};
use registrykit::{Client, Scope};
use rollout::{AutoConfirm, InstallOptions, Plan, RunReport};
use std::io::IsTerminal;
use std::time::Duration;

use crate::Context;
use crate::cli::InstallArgs;
use crate::progress::{ConsoleProgress, PromptConfirm};
use crate::report::{self, RunFlags, RunRecord};
use crate::runtime;
use crate::ui;

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    ui::header("modstrap install");

    let host = runtime::check();
    runtime::warn_if_fallback(&host, ctx.quiet);

    let (manifest, manifest_path) = super::load(ctx)?;

    let selection = if args.silent {
        silent_selection(&manifest)
    } else {
        super::selection(&args.selection)?
    };
    let resolution = super::resolve(&manifest, &selection)?;
    super::show_resolution(ctx, &selection, &resolution);

    if resolution.modules.is_empty() {
        ui::warn("Nothing to install");
        return Ok(());
    }

    let plan = rollout::plan(
        &resolution.modules,
        &manifest.settings.classification,
        &manifest.settings.capacity,
    );
    if !ctx.quiet {
        show_plan_overview(&plan);
    }

    let interactive = !args.silent && std::io::stdin().is_terminal() && console::user_attended();
    if interactive && !args.dry_run {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Install {} modules?", plan.total_modules()))
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            ui::info("Cancelled");
            return Ok(());
        }
    }

    let opts = InstallOptions {
        force: args.force,
        dry_run: args.dry_run,
        skip_version_check: args.skip_version_check,
        automated: !interactive,
        scope: Scope::CurrentUser,
        on_version_check_failure: manifest.settings.on_version_check_failure,
        pause_between_batches: manifest.settings.pause_between_batches && interactive,
        batch_delay: Duration::from_secs(manifest.settings.batch_delay_secs),
    };
    log::debug!("Install options: {opts:?}");

    let client = Client::new().context("Cannot install modules without a PowerShell host")?;

    let started_at = Utc::now();
    let mut progress = ConsoleProgress::new(ctx.quiet);
    let report = if interactive {
        rollout::execute(&client, &plan, &opts, &mut progress, &mut PromptConfirm)?
    } else {
        rollout::execute(&client, &plan, &opts, &mut progress, &mut AutoConfirm)?
    };

    show_run_summary(&report, args.dry_run);

    if let Some(path) = &args.report {
        let record = RunRecord::new(
            started_at,
            &manifest_path,
            selection,
            resolution.services.clone(),
            RunFlags {
                force: args.force,
                silent: args.silent,
                dry_run: args.dry_run,
                skip_version_check: args.skip_version_check,
            },
            report,
        );
        report::write(path, &record)?;
        if !ctx.quiet {
            ui::kv("Report", &path.display().to_string());
        }
    }

    // Partial failures still count as a completed run
    Ok(())
}

/// Selection for unattended runs: the configured broadest profile, or
/// every enabled service
fn silent_selection(manifest: &Manifest) -> Selection {
    match &manifest.settings.broadest_profile {
        Some(name) => Selection::Profile(name.clone()),
        None => Selection::Default,
    }
}

fn show_plan_overview(plan: &Plan) {
    ui::section("Batches");
    for batch in plan.non_empty() {
        let groups = if batch.groups.len() > 1 {
            format!(", {} groups", batch.groups.len())
        } else {
            String::new()
        };
        ui::kv(batch.name(), &format!("{} modules{groups}", batch.len()));
    }
}

fn show_run_summary(report: &RunReport, dry_run: bool) {
    let summary = report.summary();
    let title = if dry_run { "Dry run" } else { "Install" };
    ui::summary(title, &summary);

    if let Some(kind) = report.stopped_before {
        if report.batches.last().is_some_and(|b| b.stopped) {
            ui::warn(&format!("Stopped partway through the {kind} batch"));
        } else {
            ui::warn(&format!("Stopped before the {kind} batch"));
        }
    }
    if summary.failed.iter().any(|f| f.possibly_spurious) {
        ui::dim("Failures marked possibly spurious often succeed on a second, attended run.");
    }
}
