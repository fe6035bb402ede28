//! Module version parsing and comparison.
//!
//! Registry versions are dotted numeric strings with one to four
//! components (`2.0`, `1.5.0`, `2.25.0.0`), optionally followed by a
//! prerelease label (`3.0.0-preview2`). Missing trailing components compare
//! as zero, so `1.0` and `1.0.0` are equal.

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed module version.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
    prerelease: Option<String>,
}

impl Version {
    /// Numeric components as written.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Prerelease label, if any.
    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    /// Whether this is a prerelease version.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Whether this version satisfies a minimum requirement (`self >= minimum`).
    pub fn satisfies(&self, minimum: &Version) -> bool {
        self >= minimum
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        let (numeric, prerelease) = match trimmed.split_once('-') {
            Some((n, pre)) if !pre.is_empty() => (n, Some(pre.to_string())),
            Some(_) => return Err(Error::InvalidVersion(s.to_string())),
            None => (trimmed, None),
        };

        let components = numeric
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidVersion(s.to_string()))?;

        if components.is_empty() || components.len() > 4 {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        Ok(Self {
            components,
            prerelease,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.components.len().max(other.components.len());
        for i in 0..width {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }

        // A release sorts after any prerelease of the same numeric version
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeric: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", numeric.join("."))?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
