//! Data types for the manifest crate

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

fn default_true() -> bool {
    true
}

/// Root of a service manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Services keyed by name, in file order
    #[serde(default)]
    pub services: IndexMap<String, Service>,

    /// Profiles keyed by name, in file order
    #[serde(default)]
    pub profiles: IndexMap<String, Profile>,

    /// Installer settings
    #[serde(default)]
    pub settings: Settings,
}

impl Manifest {
    /// Fill in names from map keys where the entries omit them
    pub(crate) fn normalize(mut self) -> Self {
        for (key, service) in &mut self.services {
            if service.name.is_empty() {
                service.name = key.clone();
            }
        }
        for (key, profile) in &mut self.profiles {
            if profile.name.is_empty() {
                profile.name = key.clone();
            }
        }
        self
    }

    /// Find a service by name
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Find a profile by name
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Names of services enabled at manifest level, in file order
    pub fn enabled_services(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Profile names, in file order
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Total number of module definitions across all services
    pub fn module_count(&self) -> usize {
        self.services.values().map(|s| s.modules.len()).sum()
    }
}

/// A named group of related modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Service name (defaults to its key in the manifest)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Whether the service contributes modules at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Resolution order, ascending; `None` sorts after every explicit priority
    #[serde(default)]
    pub priority: Option<i64>,

    /// Modules keyed by name, in file order
    #[serde(default)]
    pub modules: IndexMap<String, ModuleSpec>,
}

impl Service {
    /// Sort key: explicit priorities first, ascending, then unprioritised
    pub fn sort_key(&self) -> (bool, i64) {
        (self.priority.is_none(), self.priority.unwrap_or(0))
    }

    /// Modules that are enabled, in file order
    pub fn enabled_modules(&self) -> impl Iterator<Item = (&String, &ModuleSpec)> {
        self.modules.iter().filter(|(_, m)| m.enabled)
    }
}

/// Definition of a single installable module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    #[serde(default)]
    pub version: VersionConstraint,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Informational only
    #[serde(default)]
    pub required: bool,
}

/// Requested version of a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionConstraint {
    /// Newest version available in the registry
    #[default]
    Latest,
    /// Any installed version at or above this literal satisfies the request
    Minimum(String),
}

impl VersionConstraint {
    /// Parse a constraint; `latest` (any case) or empty means [`VersionConstraint::Latest`]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else {
            Self::Minimum(trimmed.to_string())
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// The version literal, if any
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Latest => None,
            Self::Minimum(v) => Some(v),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Minimum(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for VersionConstraint {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A named, curated subset of services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name (defaults to its key in the manifest)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Service names in the order they were listed
    #[serde(default)]
    pub services: Vec<String>,
}

// ============================================================================
// Settings
// ============================================================================

/// Installer settings carried in the manifest's `settings` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rules used to sort modules into batches
    pub classification: ClassificationRules,

    /// Shared registry capacity budget
    pub capacity: Capacity,

    /// What to do when the newest-version lookup fails
    pub on_version_check_failure: VersionCheckPolicy,

    /// Fixed delay between non-empty batches
    pub batch_delay_secs: u64,

    /// Ask before each batch after the first
    pub pause_between_batches: bool,

    /// Profile selected by silent mode; every enabled service when absent
    pub broadest_profile: Option<String>,
}

/// Name-based rules that assign modules to batches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Prefixes identifying the bulk module family (e.g. `Microsoft.Graph.`)
    pub bulk_prefixes: Vec<String>,

    /// Bulk modules installed together before the rest of the family
    pub essential: Vec<String>,

    /// Modules installed last, in their own batch
    pub service_specific: Vec<String>,
}

impl ClassificationRules {
    /// Whether a module belongs to the bulk family
    pub fn is_bulk(&self, module: &str) -> bool {
        self.bulk_prefixes
            .iter()
            .any(|prefix| starts_with_ignore_case(module, prefix))
    }

    /// Whether a module is on the bulk-essential allow-list
    pub fn is_essential(&self, module: &str) -> bool {
        contains_ignore_case(&self.essential, module)
    }

    /// Whether a module belongs to the service-specific set
    pub fn is_service_specific(&self, module: &str) -> bool {
        contains_ignore_case(&self.service_specific, module)
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn contains_ignore_case(list: &[String], name: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(name))
}

/// Capacity budget for registering commands in the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    /// Bulk-remainder modules installed per group
    pub bulk_group_size: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self { bulk_group_size: 1 }
    }
}

/// Behaviour when the newest-available lookup for a `latest` module fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionCheckPolicy {
    /// Treat the installed version as good enough
    #[default]
    KeepExisting,
    /// Record the module as failed and leave it untouched
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constraint_parse() {
        assert_eq!(VersionConstraint::parse("latest"), VersionConstraint::Latest);
        assert_eq!(VersionConstraint::parse("LATEST"), VersionConstraint::Latest);
        assert_eq!(VersionConstraint::parse(""), VersionConstraint::Latest);
        assert_eq!(
            VersionConstraint::parse(" 2.0.0 "),
            VersionConstraint::Minimum("2.0.0".to_string())
        );
    }

    #[test]
    fn test_service_sort_key_unprioritised_last() {
        let mut a = Service {
            name: "a".into(),
            description: String::new(),
            enabled: true,
            priority: None,
            modules: IndexMap::new(),
        };
        let mut b = a.clone();
        b.priority = Some(i64::MAX);
        assert!(b.sort_key() < a.sort_key());

        a.priority = Some(-5);
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn test_classification_rules() {
        let rules = ClassificationRules {
            bulk_prefixes: vec!["Microsoft.Graph.".into()],
            essential: vec!["Microsoft.Graph.Authentication".into()],
            service_specific: vec!["MicrosoftTeams".into()],
        };
        assert!(rules.is_bulk("Microsoft.Graph.Users"));
        assert!(rules.is_bulk("microsoft.graph.users"));
        assert!(!rules.is_bulk("Microsoft.Graph"));
        assert!(rules.is_essential("microsoft.graph.authentication"));
        assert!(rules.is_service_specific("MicrosoftTeams"));
        assert!(!rules.is_service_specific("Az.Accounts"));
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.capacity.bulk_group_size, 1);
        assert_eq!(
            settings.on_version_check_failure,
            VersionCheckPolicy::KeepExisting
        );
        assert!(!settings.pause_between_batches);
        assert!(settings.broadest_profile.is_none());
    }

    #[test]
    fn test_version_check_policy_kebab_case() {
        let policy: VersionCheckPolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(policy, VersionCheckPolicy::Abort);
        let policy: VersionCheckPolicy = serde_json::from_str("\"keep-existing\"").unwrap();
        assert_eq!(policy, VersionCheckPolicy::KeepExisting);
    }
}
