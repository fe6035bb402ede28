//! Error types for registry operations.
//!
//! Errors carry a structured [`ErrorKind`] so callers can decide how to
//! react (soft-succeed, flag, fail) without inspecting message text. The
//! only place that reads host output prose is [`Error::from_host_output`],
//! which runs at the backend boundary.

use thiserror::Error;

/// Categories of registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Module files are locked or in use by another process
    Locked,
    /// The package source is not trusted and installation was refused
    Untrusted,
    /// Network or registry connectivity failure
    Network,
    /// Module not found in the registry
    NotFound,
    /// The PowerShell host could not be found
    HostNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorKind {
    /// Whether an existing install remains usable despite this failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Locked => "Module files in use",
            Self::Untrusted => "Untrusted package source",
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Module not found",
            Self::HostNotFound => "PowerShell not installed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error kind.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Locked => "Close other PowerShell sessions using the module and re-run",
            Self::Untrusted => {
                "Trust the repository (Set-PSRepository -InstallationPolicy Trusted) or re-run interactively"
            }
            Self::Network => "Check your internet connection and try again",
            Self::NotFound => "Verify the module name in the manifest",
            Self::HostNotFound => "Install PowerShell from https://aka.ms/powershell",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Module files are locked by another process
    #[error("module in use: {name}: {message}")]
    Locked {
        /// Module that could not be replaced
        name: String,
        /// Raw message reported by the host
        message: String,
    },

    /// Package source is untrusted
    #[error("untrusted source for {name}: {message}")]
    Untrusted {
        /// Module whose installation was refused
        name: String,
        /// Raw message reported by the host
        message: String,
    },

    /// Network-related error (connection, timeout, DNS, etc.)
    #[error("network error: {message}")]
    Network {
        /// Detailed error message from the failed network operation
        message: String,
    },

    /// Module not found in the registry
    #[error("module not found: {name}")]
    NotFound {
        /// Name of the module that could not be found
        name: String,
    },

    /// PowerShell host is not installed or not found in PATH
    #[error("PowerShell not found (looked for pwsh and powershell)")]
    HostNotFound,

    /// Version string could not be parsed
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    /// Module name is not acceptable for the host
    #[error("invalid module name: {0:?}")]
    InvalidName(String),

    /// Command execution failed
    #[error("{message}{}", stderr_suffix(.stderr))]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the structured kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Locked { .. } => ErrorKind::Locked,
            Error::Untrusted { .. } => ErrorKind::Untrusted,
            Error::Network { .. } => ErrorKind::Network,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::HostNotFound => ErrorKind::HostNotFound,
            _ => ErrorKind::Other,
        }
    }

    /// Create an error from PowerShell host output.
    ///
    /// Analyzes stderr to categorize the error.
    pub fn from_host_output(stderr: &str, module_name: Option<&str>) -> Self {
        let lower = stderr.to_lowercase();
        let name = module_name.unwrap_or("unknown").to_string();
        let message = stderr.trim().to_string();

        if lower.contains("currently in use")
            || lower.contains("being used by another process")
            || lower.contains("in use. retry the operation")
            || (lower.contains("access to the path") && lower.contains("in use"))
        {
            return Error::Locked { name, message };
        }

        if lower.contains("untrusted repository")
            || lower.contains("installationpolicy")
            || lower.contains("are you sure you want to install the modules from")
        {
            return Error::Untrusted { name, message };
        }

        if lower.contains("no match was found")
            || lower.contains("unable to find module")
            || lower.contains("was not found in any module directory")
        {
            return Error::NotFound { name };
        }

        if lower.contains("unable to resolve package source")
            || lower.contains("unable to connect")
            || lower.contains("could not resolve")
            || lower.contains("timed out")
            || lower.contains("no such host")
            || lower.contains("ssl")
            || lower.contains("network")
        {
            return Error::Network { message };
        }

        Error::CommandFailed {
            message: format!(
                "PowerShell command failed{}",
                module_name.map(|n| format!(" for {n}")).unwrap_or_default()
            ),
            stderr: message,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
