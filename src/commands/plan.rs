//! `modstrap plan` - show resolution and batches without touching the registry

use anyhow::Result;
use colored::Colorize;
use rollout::Plan;

use crate::Context;
use crate::cli::SelectionArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &SelectionArgs) -> Result<()> {
    ui::header("modstrap plan");

    let (manifest, _) = super::load(ctx)?;
    let selection = super::selection(args)?;
    let resolution = super::resolve(&manifest, &selection)?;
    super::show_resolution(ctx, &selection, &resolution);

    let plan = rollout::plan(
        &resolution.modules,
        &manifest.settings.classification,
        &manifest.settings.capacity,
    );

    if plan.is_empty() {
        ui::warn("Nothing to install");
        return Ok(());
    }

    show_batches(&plan, |module| resolution.origins.get(module).map(String::as_str));
    Ok(())
}

fn show_batches<'a, F>(plan: &Plan, origin: F)
where
    F: Fn(&str) -> Option<&'a str>,
{
    let total = plan.non_empty().count();
    for (i, batch) in plan.non_empty().enumerate() {
        println!();
        ui::step(
            i + 1,
            total,
            &format!("{} ({})", batch.kind.description().bold(), batch.name()),
        );
        let grouped = batch.groups.len() > 1;
        for (g, group) in batch.groups.iter().enumerate() {
            if grouped {
                ui::dim(&format!("group {}", g + 1));
            }
            for module in group {
                let from = origin(&module.name)
                    .map(|s| format!(" [{s}]").dimmed().to_string())
                    .unwrap_or_default();
                println!("    {} {}{}", module.name, module.version.to_string().cyan(), from);
            }
        }
    }
    println!();
    ui::info(&format!(
        "{} modules in {} batches",
        plan.total_modules(),
        total
    ));
}
