//! Resolution of a selection into a concrete module set
//!
//! A [`Selection`] picks services (by profile, by explicit list, or the
//! manifest defaults). [`resolve`] orders those services by priority and
//! flattens their enabled modules into a [`ResolvedModuleSet`]. When two
//! services define the same module, the service that sorts later wins.

use crate::error::{Error, Result};
use crate::types::{Manifest, Service, VersionConstraint};
use indexmap::IndexMap;
use serde::Serialize;

/// Which services to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum Selection {
    /// A named profile from the manifest
    Profile(String),
    /// An explicit list of service names
    Services(Vec<String>),
    /// Every service enabled at manifest level
    Default,
}

impl Selection {
    /// Build a selection from CLI-style inputs.
    ///
    /// Precedence is profile, then service list, then manifest defaults.
    pub fn from_args(profile: Option<&str>, services: Option<&str>) -> Result<Self> {
        if let Some(name) = profile.map(str::trim).filter(|p| !p.is_empty()) {
            return Ok(Self::Profile(name.to_string()));
        }
        if let Some(raw) = services {
            let names = parse_service_list(raw);
            if names.is_empty() {
                return Err(Error::EmptySelection);
            }
            return Ok(Self::Services(names));
        }
        Ok(Self::Default)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profile(name) => write!(f, "profile '{name}'"),
            Self::Services(names) => write!(f, "services [{}]", names.join(", ")),
            Self::Default => write!(f, "default services"),
        }
    }
}

/// Split a comma-separated service list, dropping blanks
pub fn parse_service_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Flattened module name to version constraint map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedModuleSet(IndexMap<String, VersionConstraint>);

impl ResolvedModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a module; returns the previous constraint.
    ///
    /// Module names match case-insensitively; the first spelling is kept.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: VersionConstraint,
    ) -> Option<VersionConstraint> {
        let name = name.into();
        match self.key_of(&name) {
            Some(existing) => self.0.insert(existing, version),
            None => self.0.insert(name, version),
        }
    }

    pub fn get(&self, name: &str) -> Option<&VersionConstraint> {
        self.key_of(name).and_then(|k| self.0.get(&k))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VersionConstraint)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    fn key_of(&self, name: &str) -> Option<String> {
        self.0
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl FromIterator<(String, VersionConstraint)> for ResolvedModuleSet {
    fn from_iter<I: IntoIterator<Item = (String, VersionConstraint)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, version) in iter {
            set.insert(name, version);
        }
        set
    }
}

/// A module definition replaced by a later service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Override {
    pub module: String,
    pub previous_service: String,
    pub previous_version: VersionConstraint,
    pub service: String,
    pub version: VersionConstraint,
}

/// Result of resolving a selection
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// The resolved module set
    pub modules: ResolvedModuleSet,
    /// Services applied, in priority order
    pub services: Vec<String>,
    /// Service that supplied each module's final definition
    pub origins: IndexMap<String, String>,
    /// Definitions overwritten by later services
    pub overrides: Vec<Override>,
    /// Selected names with no matching service
    pub unknown_services: Vec<String>,
    /// Selected services skipped because they are disabled
    pub disabled_services: Vec<String>,
}

/// Resolve a selection against a manifest.
pub fn resolve(manifest: &Manifest, selection: &Selection) -> Result<Resolution> {
    let targets: Vec<String> = match selection {
        Selection::Profile(name) => {
            let profile = manifest
                .profile(name)
                .ok_or_else(|| Error::ProfileNotFound {
                    name: name.clone(),
                    available: manifest.profile_names(),
                })?;
            profile.services.clone()
        }
        Selection::Services(names) => names.clone(),
        Selection::Default => manifest.enabled_services(),
    };

    let mut resolution = Resolution::default();
    let mut services: Vec<&Service> = Vec::new();

    for target in &targets {
        let Some(service) = find_service(manifest, target) else {
            log::warn!("Service '{target}' is not defined in the manifest, skipping");
            push_unique(&mut resolution.unknown_services, target);
            continue;
        };
        if services.iter().any(|s| std::ptr::eq(*s, service)) {
            continue;
        }
        if !service.enabled {
            log::debug!("Service '{}' is disabled, skipping", service.name);
            push_unique(&mut resolution.disabled_services, &service.name);
            continue;
        }
        services.push(service);
    }

    // Stable: equal priorities keep selection order
    services.sort_by_key(|s| s.sort_key());

    for service in services {
        resolution.services.push(service.name.clone());

        for (module, spec) in service.enabled_modules() {
            let previous = resolution.modules.insert(module.clone(), spec.version.clone());
            let key = resolution
                .modules
                .key_of(module)
                .unwrap_or_else(|| module.clone());

            if let Some(previous_version) = previous {
                let previous_service = resolution
                    .origins
                    .get(&key)
                    .cloned()
                    .unwrap_or_default();
                log::debug!(
                    "Module '{module}' from '{}' ({}) overrides '{previous_service}' ({previous_version})",
                    service.name,
                    spec.version
                );
                resolution.overrides.push(Override {
                    module: key.clone(),
                    previous_service,
                    previous_version,
                    service: service.name.clone(),
                    version: spec.version.clone(),
                });
            }
            resolution.origins.insert(key, service.name.clone());
        }
    }

    Ok(resolution)
}

fn find_service<'a>(manifest: &'a Manifest, name: &str) -> Option<&'a Service> {
    manifest.service(name).or_else(|| {
        manifest
            .services
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, s)| s)
    })
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_json_str;

    fn scenario() -> Manifest {
        from_json_str(
            r#"{
                "services": {
                    "auth": {
                        "priority": 1,
                        "modules": { "Core.Auth": { "version": "2.0.0" } }
                    },
                    "reports": {
                        "priority": 2,
                        "modules": {
                            "Core.Reports": { "version": "1.5.0" },
                            "Core.Reports.Legacy": { "version": "1.0.0", "enabled": false }
                        }
                    }
                },
                "profiles": {
                    "basic": { "services": ["reports", "auth"] }
                }
            }"#,
        )
        .unwrap()
    }

    fn v(s: &str) -> VersionConstraint {
        VersionConstraint::parse(s)
    }

    #[test]
    fn test_profile_scenario() {
        let manifest = scenario();
        let res = resolve(&manifest, &Selection::Profile("basic".into())).unwrap();

        let expected: ResolvedModuleSet = [
            ("Core.Auth".to_string(), v("2.0.0")),
            ("Core.Reports".to_string(), v("1.5.0")),
        ]
        .into_iter()
        .collect();
        assert_eq!(res.modules, expected);
        assert_eq!(res.services, vec!["auth", "reports"]);
        assert!(!res.modules.contains("Core.Reports.Legacy"));
    }

    #[test]
    fn test_profile_not_found() {
        let manifest = scenario();
        let err = resolve(&manifest, &Selection::Profile("nope".into())).unwrap_err();
        match err {
            Error::ProfileNotFound { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, vec!["basic"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_selection_precedence_profile_wins() {
        let sel = Selection::from_args(Some("basic"), Some("auth")).unwrap();
        assert_eq!(sel, Selection::Profile("basic".into()));

        let manifest = scenario();
        let res = resolve(&manifest, &sel).unwrap();
        assert!(res.modules.contains("Core.Reports"));
    }

    #[test]
    fn test_selection_override_beats_default() {
        let sel = Selection::from_args(None, Some(" auth , ,")).unwrap();
        assert_eq!(sel, Selection::Services(vec!["auth".into()]));
        assert_eq!(Selection::from_args(None, None).unwrap(), Selection::Default);
        assert_eq!(Selection::from_args(Some("  "), None).unwrap(), Selection::Default);
        assert!(matches!(
            Selection::from_args(None, Some(" , ")),
            Err(Error::EmptySelection)
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let manifest = scenario();
        let sel = Selection::Default;
        let a = resolve(&manifest, &sel).unwrap();
        let b = resolve(&manifest, &sel).unwrap();
        assert_eq!(a.modules, b.modules);
    }

    #[test]
    fn test_override_last_priority_wins() {
        let manifest = from_json_str(
            r#"{
                "services": {
                    "late":  { "priority": 10, "modules": { "Shared": { "version": "3.0.0" } } },
                    "early": { "priority": 1,  "modules": { "Shared": { "version": "1.0.0" } } }
                }
            }"#,
        )
        .unwrap();

        let res = resolve(&manifest, &Selection::Default).unwrap();
        assert_eq!(res.modules.get("Shared"), Some(&v("3.0.0")));
        assert_eq!(res.overrides.len(), 1);
        assert_eq!(res.overrides[0].previous_service, "early");
        assert_eq!(res.overrides[0].service, "late");
        assert_eq!(res.origins.get("Shared").unwrap(), "late");
    }

    #[test]
    fn test_override_matches_case_insensitively() {
        let manifest = from_json_str(
            r#"{
                "services": {
                    "a": { "priority": 1, "modules": { "Az.Accounts": { "version": "1.0" } } },
                    "b": { "priority": 2, "modules": { "az.accounts": { "version": "2.0" } } }
                }
            }"#,
        )
        .unwrap();

        let res = resolve(&manifest, &Selection::Default).unwrap();
        assert_eq!(res.modules.len(), 1);
        assert_eq!(res.modules.get("AZ.ACCOUNTS"), Some(&v("2.0")));
    }

    #[test]
    fn test_disabled_service_contributes_nothing() {
        let manifest = from_json_str(
            r#"{
                "services": {
                    "off": {
                        "enabled": false,
                        "modules": { "A": { "version": "latest", "enabled": true } }
                    },
                    "on": { "modules": { "B": {} } }
                },
                "profiles": { "both": { "services": ["off", "on"] } }
            }"#,
        )
        .unwrap();

        for sel in [
            Selection::Default,
            Selection::Profile("both".into()),
            Selection::Services(vec!["off".into(), "on".into()]),
        ] {
            let res = resolve(&manifest, &sel).unwrap();
            assert!(!res.modules.contains("A"), "{sel}");
            assert!(res.modules.contains("B"), "{sel}");
        }

        let res = resolve(&manifest, &Selection::Services(vec!["off".into()])).unwrap();
        assert!(res.modules.is_empty());
        assert_eq!(res.disabled_services, vec!["off"]);
    }

    #[test]
    fn test_unprioritised_services_sort_last_and_ties_are_stable() {
        let manifest = from_json_str(
            r#"{
                "services": {
                    "none": { "modules": { "M": { "version": "9.0" } } },
                    "tie_b": { "priority": 5, "modules": { "M": { "version": "2.0" } } },
                    "tie_a": { "priority": 5, "modules": { "M": { "version": "1.0" } } },
                    "first": { "priority": 0, "modules": { "M": { "version": "0.1" } } }
                }
            }"#,
        )
        .unwrap();

        let res = resolve(&manifest, &Selection::Default).unwrap();
        assert_eq!(res.services, vec!["first", "tie_b", "tie_a", "none"]);
        assert_eq!(res.modules.get("M"), Some(&v("9.0")));

        // Explicit list order decides ties
        let res = resolve(
            &manifest,
            &Selection::Services(vec!["tie_a".into(), "tie_b".into()]),
        )
        .unwrap();
        assert_eq!(res.services, vec!["tie_a", "tie_b"]);
        assert_eq!(res.modules.get("M"), Some(&v("2.0")));
    }

    #[test]
    fn test_unknown_and_duplicate_services() {
        let manifest = scenario();
        let res = resolve(
            &manifest,
            &Selection::Services(vec!["AUTH".into(), "ghost".into(), "auth".into()]),
        )
        .unwrap();
        assert_eq!(res.services, vec!["auth"]);
        assert_eq!(res.unknown_services, vec!["ghost"]);
    }

    #[test]
    fn test_distinct_keys_sharing_a_display_name_both_resolve() {
        let manifest = from_json_str(
            r#"{
                "services": {
                    "graph-read": { "name": "graph", "modules": { "G.Read": {} } },
                    "graph-write": { "name": "graph", "modules": { "G.Write": {} } }
                }
            }"#,
        )
        .unwrap();

        let res = resolve(&manifest, &Selection::Default).unwrap();
        assert_eq!(res.modules.len(), 2);
        assert!(res.modules.contains("G.Read"));
        assert!(res.modules.contains("G.Write"));
    }
}
