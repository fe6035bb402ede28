pub mod install;
pub mod list;
pub mod plan;
pub mod status;

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use manifest::{Manifest, Resolution, Selection};
use std::path::PathBuf;

use crate::Context;
use crate::cli::SelectionArgs;
use crate::config;
use crate::ui;

/// Load the manifest named on the command line (or discovered)
fn load(ctx: &Context) -> Result<(Manifest, PathBuf)> {
    let (manifest, path) = config::load_manifest(ctx.config.as_deref())?;
    if !ctx.quiet {
        ui::kv("Manifest", &path.display().to_string());
    }
    Ok((manifest, path))
}

fn selection(args: &SelectionArgs) -> Result<Selection> {
    Ok(Selection::from_args(
        args.profile.as_deref(),
        args.services.as_deref(),
    )?)
}

fn resolve(manifest: &Manifest, selection: &Selection) -> Result<Resolution> {
    manifest::resolve(manifest, selection)
        .with_context(|| format!("Could not resolve {selection}"))
}

/// Print how a selection was resolved: service order, overrides and
/// anything that was skipped
fn show_resolution(ctx: &Context, selection: &Selection, resolution: &Resolution) {
    for name in &resolution.unknown_services {
        ui::warn(&format!("Unknown service '{name}' skipped"));
    }
    for name in &resolution.disabled_services {
        ui::warn(&format!("Service '{name}' is disabled and was skipped"));
    }

    if ctx.quiet {
        return;
    }

    ui::kv("Selection", &selection.to_string());
    ui::kv(
        "Services",
        &if resolution.services.is_empty() {
            "(none)".to_string()
        } else {
            resolution.services.join(" → ")
        },
    );
    ui::kv("Modules", &resolution.modules.len().to_string());

    if !resolution.overrides.is_empty() && ctx.verbose > 0 {
        ui::section("Overrides");
        for o in &resolution.overrides {
            println!(
                "  {} {} {} {}",
                o.module.bold(),
                format!("{} ({})", o.previous_version, o.previous_service).dimmed(),
                "→".dimmed(),
                format!("{} ({})", o.version, o.service),
            );
        }
    } else if !resolution.overrides.is_empty() {
        ui::dim(&format!(
            "{} module(s) declared by more than one service; the later service in priority order wins (-v for details)",
            resolution.overrides.len()
        ));
    }
}
