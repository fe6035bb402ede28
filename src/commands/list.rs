//! `modstrap profiles` and `modstrap services`

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

pub fn profiles(ctx: &Context) -> Result<()> {
    let (manifest, _) = super::load(ctx)?;

    ui::header("Profiles");
    if manifest.profiles.is_empty() {
        ui::dim("No profiles defined; installs use every enabled service");
        return Ok(());
    }

    for profile in manifest.profiles.values() {
        let marker = if manifest.settings.broadest_profile.as_deref() == Some(profile.name.as_str())
        {
            " (silent default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", profile.name.bold(), marker);
        if !profile.description.is_empty() {
            ui::dim(&format!("  {}", profile.description));
        }
        ui::kv("  services", &profile.services.join(", "));
    }
    Ok(())
}

pub fn services(ctx: &Context) -> Result<()> {
    let (manifest, _) = super::load(ctx)?;

    ui::header("Services");
    if manifest.services.is_empty() {
        ui::dim("No services defined");
        return Ok(());
    }

    for service in manifest.services.values() {
        let state = if service.enabled {
            "✓".green()
        } else {
            "○".dimmed()
        };
        let priority = service
            .priority
            .map(|p| format!("priority {p}"))
            .unwrap_or_else(|| "no priority".to_string());
        println!(
            "  {} {} {}",
            state,
            service.name.bold(),
            format!("({priority})").dimmed()
        );
        if !service.description.is_empty() {
            ui::dim(&format!("  {}", service.description));
        }
        for (name, spec) in &service.modules {
            let mut line = format!("    {name} {}", spec.version.to_string().cyan());
            if spec.required {
                line.push_str(&format!(" {}", "required".yellow()));
            }
            if !spec.enabled {
                line = format!("    {}", format!("{name} {} (disabled)", spec.version).dimmed());
            }
            println!("{line}");
        }
    }

    println!();
    ui::info(&format!(
        "{} services ({} enabled), {} modules",
        manifest.services.len(),
        manifest.enabled_services().len(),
        manifest.module_count()
    ));
    Ok(())
}
