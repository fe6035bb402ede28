//! Core types for module registry operations.

use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Installation scope for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Per-user module path, no elevation required
    #[default]
    CurrentUser,
    /// Machine-wide module path
    AllUsers,
}

impl Scope {
    /// Value passed to `-Scope`.
    pub fn as_arg(&self) -> &'static str {
        match self {
            Scope::CurrentUser => "CurrentUser",
            Scope::AllUsers => "AllUsers",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}

/// A request to install one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Module name (e.g., "Microsoft.Graph.Authentication")
    pub name: String,
    /// Target scope
    pub scope: Scope,
    /// Exact version to install; newest when `None`
    pub pinned_version: Option<Version>,
    /// Allow the module to overwrite commands exported by other modules
    pub allow_clobber: bool,
    /// Suppress confirmation prompts (including untrusted-source prompts)
    pub force: bool,
}

impl InstallRequest {
    /// Create a user-scope request for the newest version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Scope::CurrentUser,
            pinned_version: None,
            allow_clobber: true,
            force: false,
        }
    }

    /// Pin the install to an exact version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.pinned_version = Some(version);
        self
    }

    /// Set the installation scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set whether prompts are suppressed.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Information about an installed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModule {
    /// Module name
    pub name: String,
    /// Highest installed version
    pub version: Version,
}
