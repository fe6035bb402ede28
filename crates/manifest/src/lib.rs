//! # Manifest
//!
//! Declarative description of services, their modules, and the profiles
//! that group them.
//!
//! This crate provides functionality to:
//! - Load a manifest from JSON or TOML
//! - Resolve a profile, service list, or the defaults into a flat,
//!   priority-ordered module set
//!
//! ## Example
//!
//! ```no_run
//! use manifest::{Selection, resolve};
//! use std::path::Path;
//!
//! let manifest = manifest::load(Path::new("modstrap.toml"))?;
//! let selection = Selection::from_args(Some("admin"), None)?;
//! let resolution = resolve(&manifest, &selection)?;
//!
//! for (name, version) in resolution.modules.iter() {
//!     println!("{name} {version}");
//! }
//! # Ok::<(), manifest::Error>(())
//! ```

mod error;
mod resolve;
mod types;

pub use error::{Error, Result};
pub use resolve::{Override, Resolution, ResolvedModuleSet, Selection, parse_service_list, resolve};
pub use types::{
    Capacity, ClassificationRules, Manifest, ModuleSpec, Profile, Service, Settings,
    VersionCheckPolicy, VersionConstraint,
};

use std::path::{Path, PathBuf};

/// On-disk manifest format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Pick a format from a file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Load a manifest from a file
///
/// Fails when the file is missing, unreadable, or not well-formed.
/// Absent optional fields take their defaults.
pub fn load(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest = parse(&content, Format::from_path(path), path)?;
    log::debug!(
        "Loaded manifest from {} ({} services, {} profiles)",
        path.display(),
        manifest.services.len(),
        manifest.profiles.len()
    );
    Ok(manifest)
}

/// Parse a manifest from a JSON string
pub fn from_json_str(content: &str) -> Result<Manifest> {
    parse(content, Format::Json, Path::new("<string>"))
}

/// Parse a manifest from a TOML string
pub fn from_toml_str(content: &str) -> Result<Manifest> {
    parse(content, Format::Toml, Path::new("<string>"))
}

fn parse(content: &str, format: Format, origin: &Path) -> Result<Manifest> {
    let path = PathBuf::from(origin);
    let manifest: Manifest = match format {
        Format::Json => {
            serde_json::from_str(content).map_err(|source| Error::Json { path, source })?
        }
        Format::Toml => toml::from_str(content).map_err(|source| Error::Toml { path, source })?,
    };
    Ok(manifest.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML_MANIFEST: &str = r#"
[settings]
batch_delay_secs = 2
on_version_check_failure = "abort"

[settings.classification]
bulk_prefixes = ["Microsoft.Graph."]
essential = ["Microsoft.Graph.Authentication"]
service_specific = ["MicrosoftTeams"]

[settings.capacity]
bulk_group_size = 3

[services.graph]
description = "Microsoft Graph"
priority = 2

[services.graph.modules."Microsoft.Graph.Authentication"]
version = "2.0.0"
required = true

[services.graph.modules."Microsoft.Graph.Users"]
version = "latest"

[services.teams]
enabled = false

[services.teams.modules.MicrosoftTeams]
version = "5.0.0"

[profiles.admin]
description = "Everything"
services = ["graph", "teams"]
"#;

    #[test]
    fn test_parse_toml() {
        let manifest = from_toml_str(TOML_MANIFEST).unwrap();

        let graph = manifest.service("graph").unwrap();
        assert_eq!(graph.name, "graph");
        assert_eq!(graph.priority, Some(2));
        assert!(graph.enabled);
        let auth = &graph.modules["Microsoft.Graph.Authentication"];
        assert_eq!(auth.version, VersionConstraint::Minimum("2.0.0".into()));
        assert!(auth.required);
        assert!(auth.enabled);
        assert!(graph.modules["Microsoft.Graph.Users"].version.is_latest());

        assert!(!manifest.service("teams").unwrap().enabled);
        assert_eq!(manifest.enabled_services(), vec!["graph"]);

        let admin = manifest.profile("admin").unwrap();
        assert_eq!(admin.name, "admin");
        assert_eq!(admin.services, vec!["graph", "teams"]);

        assert_eq!(manifest.settings.batch_delay_secs, 2);
        assert_eq!(manifest.settings.capacity.bulk_group_size, 3);
        assert_eq!(
            manifest.settings.on_version_check_failure,
            VersionCheckPolicy::Abort
        );
        assert!(manifest.settings.classification.is_bulk("Microsoft.Graph.Users"));
        assert_eq!(manifest.module_count(), 3);
    }

    #[test]
    fn test_parse_json_defaults() {
        let manifest = from_json_str(
            r#"{ "services": { "core": { "modules": { "PSReadLine": {} } } } }"#,
        )
        .unwrap();

        let core = manifest.service("core").unwrap();
        assert!(core.enabled);
        assert!(core.priority.is_none());
        let module = &core.modules["PSReadLine"];
        assert!(module.enabled);
        assert!(!module.required);
        assert!(module.version.is_latest());
        assert!(manifest.profiles.is_empty());
    }

    #[test]
    fn test_parse_json_invalid() {
        let err = from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("manifest.toml");
        std::fs::write(&toml_path, TOML_MANIFEST).unwrap();
        assert_eq!(load(&toml_path).unwrap().services.len(), 2);

        let json_path = dir.path().join("manifest.json");
        let mut file = std::fs::File::create(&json_path).unwrap();
        write!(file, r#"{{ "profiles": {{ "p": {{ "services": [] }} }} }}"#).unwrap();
        assert_eq!(load(&json_path).unwrap().profile_names(), vec!["p"]);
    }

    #[test]
    fn test_load_toml_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[services\n").unwrap();
        assert!(matches!(load(&path).unwrap_err(), Error::Toml { .. }));
    }

    #[test]
    fn test_services_keep_file_order() {
        let manifest = from_json_str(
            r#"{ "services": { "zeta": {}, "alpha": {}, "mid": {} } }"#,
        )
        .unwrap();
        assert_eq!(manifest.enabled_services(), vec!["zeta", "alpha", "mid"]);
    }
}
