//! Backend abstraction for registry operations.
//!
//! The [`Backend`] trait defines the interface for querying and installing
//! modules, allowing for different implementations (real PowerShell host,
//! stubs for testing).

pub mod pwsh;

use crate::error::Result;
use crate::types::{InstallRequest, InstalledModule};
use crate::version::Version;

/// Backend trait for registry operations.
///
/// All calls are synchronous and blocking. Timeouts, if any, are the
/// implementation's concern.
pub trait Backend: Send + Sync {
    /// Check if the backend can run at all.
    fn is_available(&self) -> bool;

    /// Highest installed version of a module, or `None` if absent.
    fn installed_version(&self, name: &str) -> Result<Option<Version>>;

    /// Newest version available from the registry.
    fn find_latest(&self, name: &str) -> Result<Version>;

    /// Install a module.
    fn install(&self, request: &InstallRequest) -> Result<()>;

    /// Whether the module is currently loaded into the host session.
    ///
    /// Backends that start a fresh host process per call (such as
    /// [`pwsh::PwshBackend`]) only see their own session, so this is
    /// effectively always `false` for them and `unload` has nothing to remove.
    fn is_loaded(&self, name: &str) -> Result<bool>;

    /// Unload a module from the host session.
    fn unload(&self, name: &str) -> Result<()>;

    /// Installed module info, if present.
    fn installed(&self, name: &str) -> Result<Option<InstalledModule>> {
        Ok(self.installed_version(name)?.map(|version| InstalledModule {
            name: name.to_string(),
            version,
        }))
    }
}

/// Get the default backend (real PowerShell host).
pub fn default_backend() -> Result<pwsh::PwshBackend> {
    pwsh::PwshBackend::new()
}
