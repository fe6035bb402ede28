//! Manifest discovery
//!
//! Lookup order: `--config` / `MODSTRAP_CONFIG`, then `./modstrap.toml`,
//! `./modstrap.json`, `~/.config/modstrap/manifest.toml` and finally
//! `~/.config/modstrap/manifest.json`.

use anyhow::{Context, Result};
use manifest::Manifest;
use std::path::{Path, PathBuf};

const LOCAL_NAMES: [&str; 2] = ["modstrap.toml", "modstrap.json"];
const USER_NAMES: [&str; 2] = ["manifest.toml", "manifest.json"];

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("modstrap"))
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).as_ref()),
    }
}

/// Paths searched when no manifest is given explicitly, in order
fn candidates(cwd: &Path, user_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = LOCAL_NAMES.iter().map(|n| cwd.join(n)).collect();
    if let Some(dir) = user_dir {
        paths.extend(USER_NAMES.iter().map(|n| dir.join(n)));
    }
    paths
}

fn locate(explicit: Option<&Path>, cwd: &Path, user_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand_path(path));
    }

    let searched = candidates(cwd, user_dir);
    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }

    let list = searched
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::bail!("No manifest found. Searched:\n{list}\nUse --config to point at one.")
}

/// Find the manifest to use
pub fn find_manifest(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let user_dir = config_dir().ok();
    locate(explicit, &cwd, user_dir.as_deref())
}

/// Find and load the manifest
pub fn load_manifest(explicit: Option<&Path>) -> Result<(Manifest, PathBuf)> {
    let path = find_manifest(explicit)?;
    let manifest = manifest::load(&path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))?;
    Ok((manifest, path))
}
