//! # registrykit
//!
//! Pure Rust client for installing PowerShell modules from a package
//! registry such as the PowerShell Gallery.
//!
//! This crate provides functionality for:
//! - Querying installed and newest-available module versions
//! - Installing modules (pinned or newest) into a user or machine scope
//! - Unloading modules from the host session before replacing them
//! - Classifying host failures into structured [`ErrorKind`]s
//!
//! ## Example
//!
//! ```no_run
//! use registrykit::{Client, InstallRequest};
//!
//! let client = Client::new().expect("PowerShell not available");
//!
//! let installed = client.installed_version("Az.Accounts").expect("query failed");
//! let latest = client.find_latest("Az.Accounts").expect("registry unreachable");
//!
//! if installed.is_none_or(|v| v < latest) {
//!     client.install(&InstallRequest::new("Az.Accounts")).expect("install failed");
//! }
//! ```
//!
//! ## Error Kinds
//!
//! Callers never need to read error messages: every [`Error`] maps to an
//! [`ErrorKind`] such as [`ErrorKind::Locked`] (module files in use) or
//! [`ErrorKind::Untrusted`] (repository not trusted).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;
pub mod version;

pub use error::{Error, ErrorKind, Result};
pub use types::{InstallRequest, InstalledModule, Scope};
pub use version::Version;

use backend::Backend;

/// High-level client for registry operations.
///
/// The client wraps a backend and is what the rest of the workspace talks to.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a new Client with the default backend.
    ///
    /// Returns an error if no PowerShell host is installed.
    pub fn new() -> Result<Self> {
        let backend = backend::default_backend()?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Check if the backend is usable.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Highest installed version of a module.
    pub fn installed_version(&self, name: &str) -> Result<Option<Version>> {
        self.backend.installed_version(name)
    }

    /// Installed module info.
    pub fn installed(&self, name: &str) -> Result<Option<InstalledModule>> {
        self.backend.installed(name)
    }

    /// Newest version available in the registry.
    pub fn find_latest(&self, name: &str) -> Result<Version> {
        self.backend.find_latest(name)
    }

    /// Install a module.
    pub fn install(&self, request: &InstallRequest) -> Result<()> {
        log::debug!(
            "Installing {} (scope: {}, version: {})",
            request.name,
            request.scope,
            request
                .pinned_version
                .as_ref()
                .map_or_else(|| "newest".to_string(), ToString::to_string)
        );
        self.backend.install(request)
    }

    /// Whether the module is loaded in the host session.
    pub fn is_loaded(&self, name: &str) -> Result<bool> {
        self.backend.is_loaded(name)
    }

    /// Unload a module from the host session.
    pub fn unload(&self, name: &str) -> Result<()> {
        self.backend.unload(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedBackend {
        installed: Option<&'static str>,
        installs: Mutex<Vec<String>>,
    }

    impl Backend for FixedBackend {
        fn is_available(&self) -> bool {
            true
        }

        fn installed_version(&self, _name: &str) -> Result<Option<Version>> {
            self.installed.map(str::parse).transpose()
        }

        fn find_latest(&self, _name: &str) -> Result<Version> {
            "3.0.0".parse()
        }

        fn install(&self, request: &InstallRequest) -> Result<()> {
            self.installs.lock().unwrap().push(request.name.clone());
            Ok(())
        }

        fn is_loaded(&self, _name: &str) -> Result<bool> {
            Ok(false)
        }

        fn unload(&self, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_client_delegates_to_backend() {
        let client = Client::with_backend(Box::new(FixedBackend {
            installed: Some("1.0.0"),
            installs: Mutex::new(Vec::new()),
        }));

        assert!(client.is_available());
        let info = client.installed("Foo").unwrap().unwrap();
        assert_eq!(info.name, "Foo");
        assert_eq!(info.version.to_string(), "1.0.0");
        assert_eq!(client.find_latest("Foo").unwrap().to_string(), "3.0.0");
        client.install(&InstallRequest::new("Foo")).unwrap();
    }

    #[test]
    fn test_client_absent_module() {
        let client = Client::with_backend(Box::new(FixedBackend {
            installed: None,
            installs: Mutex::new(Vec::new()),
        }));
        assert!(client.installed("Foo").unwrap().is_none());
    }
}
