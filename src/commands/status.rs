//! `modstrap status` - installed versions against the resolved selection
//!
//! Only the local module store is queried; `latest` modules are reported as
//! installed without asking the registry for the newest version.

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use manifest::VersionConstraint;
use registrykit::{Client, Version};

use crate::Context;
use crate::cli::SelectionArgs;
use crate::progress;
use crate::runtime;
use crate::ui;

/// Local state of one module relative to its constraint
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModuleState {
    Missing,
    /// Installed and meets the literal minimum
    Satisfied(Version),
    /// Installed, requested `latest`; not compared against the registry
    Present(Version),
    Outdated {
        installed: Version,
        required: Version,
    },
    /// The constraint is not a parseable version, or the query failed
    Unknown(String),
}

fn assess(installed: Option<Version>, constraint: &VersionConstraint) -> ModuleState {
    let Some(installed) = installed else {
        return ModuleState::Missing;
    };
    match constraint.literal().map(str::parse::<Version>) {
        None => ModuleState::Present(installed),
        Some(Ok(required)) if installed.satisfies(&required) => {
            ModuleState::Satisfied(installed)
        }
        Some(Ok(required)) => ModuleState::Outdated {
            installed,
            required,
        },
        Some(Err(e)) => ModuleState::Unknown(e.to_string()),
    }
}

pub fn run(ctx: &Context, args: &SelectionArgs) -> Result<()> {
    ui::header("modstrap status");

    let host = runtime::check();
    ui::kv("PowerShell", &host.describe());

    let (manifest, _) = super::load(ctx)?;
    let selection = super::selection(args)?;
    let resolution = super::resolve(&manifest, &selection)?;
    super::show_resolution(ctx, &selection, &resolution);

    if resolution.modules.is_empty() {
        ui::warn("No modules selected");
        return Ok(());
    }

    let client = Client::new().context("Cannot query modules without a PowerShell host")?;

    let pb = progress::spinner("Querying installed modules...");
    let states: Vec<(String, ModuleState)> = resolution
        .modules
        .iter()
        .map(|(name, constraint)| {
            pb.set_message(format!("Querying {name}..."));
            let state = match client.installed(name) {
                Ok(found) => assess(found.map(|m| m.version), constraint),
                Err(e) => ModuleState::Unknown(e.to_string()),
            };
            (name.clone(), state)
        })
        .collect();
    pb.finish_and_clear();

    ui::section("Modules");
    let mut ok = 0;
    let mut outdated = 0;
    let mut missing = 0;
    for (name, state) in &states {
        match state {
            ModuleState::Satisfied(v) | ModuleState::Present(v) => {
                ok += 1;
                if !ctx.quiet {
                    println!("  {} {} {}", "✓".green(), name, v.to_string().dimmed());
                }
            }
            ModuleState::Outdated {
                installed,
                required,
            } => {
                outdated += 1;
                println!(
                    "  {} {} {} (requires {})",
                    "↑".yellow(),
                    name,
                    installed.to_string().yellow(),
                    required
                );
            }
            ModuleState::Missing => {
                missing += 1;
                println!("  {} {} {}", "✗".red(), name, "not installed".red());
            }
            ModuleState::Unknown(reason) => {
                println!("  {} {} {}", "?".dimmed(), name, reason.dimmed());
            }
        }
    }

    println!();
    let total = states.len();
    if ok == total {
        ui::success(&format!("All {total} modules installed"));
    } else {
        ui::info(&format!(
            "{ok}/{total} ok, {outdated} outdated, {missing} missing"
        ));
        ui::dim("Run 'modstrap install' with the same selection to bring them up to date");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_assess_missing() {
        assert_eq!(
            assess(None, &VersionConstraint::Latest),
            ModuleState::Missing
        );
    }

    #[test]
    fn test_assess_satisfied_by_newer() {
        let state = assess(Some(v("2.0.0")), &VersionConstraint::parse("1.0.0"));
        assert_eq!(state, ModuleState::Satisfied(v("2.0.0")));
    }

    #[test]
    fn test_assess_outdated() {
        let state = assess(Some(v("1.0.0")), &VersionConstraint::parse("1.5"));
        assert_eq!(
            state,
            ModuleState::Outdated {
                installed: v("1.0.0"),
                required: v("1.5"),
            }
        );
    }

    #[test]
    fn test_assess_latest_is_present() {
        let state = assess(Some(v("3.1.4")), &VersionConstraint::Latest);
        assert_eq!(state, ModuleState::Present(v("3.1.4")));
    }

    #[test]
    fn test_assess_invalid_constraint() {
        let state = assess(Some(v("1.0")), &VersionConstraint::parse("banana"));
        assert!(matches!(state, ModuleState::Unknown(_)));
    }
}
