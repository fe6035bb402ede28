//! Error types for the manifest crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or resolving a manifest
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest file does not exist
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Manifest file could not be read
    #[error("failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest is not valid TOML
    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Requested profile is not defined
    #[error("profile '{name}' not found (available: {})", available_list(.available))]
    ProfileNotFound { name: String, available: Vec<String> },

    /// An explicit service list contained no names
    #[error("service list is empty")]
    EmptySelection,
}

impl Error {
    /// Whether this error came from reading or parsing the manifest source
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Read { .. } | Self::Json { .. } | Self::Toml { .. }
        )
    }
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;
