//! Core types for batched module installation

use crate::summary::{Summary, summarize};
use indexmap::IndexMap;
use manifest::{VersionCheckPolicy, VersionConstraint};
use registrykit::Scope;
use serde::Serialize;
use std::time::Duration;

/// Outcome of one module's install attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Module was installed (pinned version, or newest when `None`)
    Installed { version: Option<String> },
    /// Installed version already satisfies the request
    AlreadySatisfied { installed: String },
    /// Newest-version lookup failed; the installed version was kept
    KeptExisting { installed: String, reason: String },
    /// Install failed because module files are in use; existing version stays
    InUse { message: String },
    /// Dry run: an install would have been performed
    WouldInstall { version: Option<String> },
    /// Install failed
    Failed {
        error: String,
        /// The failure may not be real (e.g. trust prompt under automation)
        possibly_spurious: bool,
    },
}

impl Outcome {
    /// Whether this outcome counts as success
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Whether the install technically failed but was accepted
    pub fn is_soft_success(&self) -> bool {
        matches!(self, Self::InUse { .. } | Self::KeptExisting { .. })
    }

    /// Whether no install was attempted because nothing was needed
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::AlreadySatisfied { .. } | Self::KeptExisting { .. })
    }
}

/// Which stage of the fixed batch order a batch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchKind {
    /// Modules outside the bulk family and the service set
    Core,
    /// Foundational modules of the bulk family, installed together
    BulkEssential,
    /// Remaining bulk modules, installed in small groups
    BulkRemainder,
    /// Service-specific connector modules
    Service,
}

impl BatchKind {
    /// All kinds in execution order
    pub const ORDER: [BatchKind; 4] = [
        BatchKind::Core,
        BatchKind::BulkEssential,
        BatchKind::BulkRemainder,
        BatchKind::Service,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::BulkEssential => "bulk-essential",
            Self::BulkRemainder => "bulk-remainder",
            Self::Service => "service",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Core => "Core modules",
            Self::BulkEssential => "Essential bulk modules",
            Self::BulkRemainder => "Remaining bulk modules",
            Self::Service => "Service-specific modules",
        }
    }
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A module scheduled for installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedModule {
    pub name: String,
    pub version: VersionConstraint,
}

/// Options for installation
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Install even when the installed version satisfies the request
    pub force: bool,
    /// Decide but don't install
    pub dry_run: bool,
    /// Ignore literal versions: never pin, never compare
    pub skip_version_check: bool,
    /// Running unattended; prompts are suppressed by the host
    pub automated: bool,
    /// Target scope for installs
    pub scope: Scope,
    /// What to do when the newest-version lookup fails
    pub on_version_check_failure: VersionCheckPolicy,
    /// Ask before each batch after the first
    pub pause_between_batches: bool,
    /// Fixed delay between batches
    pub batch_delay: Duration,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            force: false,
            dry_run: false,
            skip_version_check: false,
            automated: false,
            scope: Scope::CurrentUser,
            on_version_check_failure: VersionCheckPolicy::KeepExisting,
            pause_between_batches: false,
            batch_delay: Duration::ZERO,
        }
    }
}

/// Outcomes of one batch, in install order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub outcomes: IndexMap<String, Outcome>,
    /// The operator declined to continue at a group boundary
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stopped: bool,
}

impl BatchReport {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            outcomes: IndexMap::new(),
            stopped: false,
        }
    }

    /// Record an outcome; the first outcome for a module is kept
    pub fn record(&mut self, name: &str, outcome: Outcome) {
        self.outcomes.entry(name.to_string()).or_insert(outcome);
    }

    /// Per-module success flags
    pub fn success_map(&self) -> IndexMap<String, bool> {
        self.outcomes
            .iter()
            .map(|(name, outcome)| (name.clone(), outcome.is_success()))
            .collect()
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.outcomes)
    }
}

/// Outcomes of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    /// Batch the operator declined to continue into (or within), if any
    pub stopped_before: Option<BatchKind>,
}

impl RunReport {
    /// Run-level summary merged from every batch
    pub fn summary(&self) -> Summary {
        let mut total = Summary::default();
        for batch in &self.batches {
            total.merge(&batch.summary());
        }
        total
    }

    /// Whether the operator stopped the run early
    pub fn was_stopped(&self) -> bool {
        self.stopped_before.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_classification() {
        assert!(Outcome::Installed { version: None }.is_success());
        assert!(
            Outcome::InUse {
                message: "locked".into()
            }
            .is_success()
        );
        assert!(
            !Outcome::Failed {
                error: "boom".into(),
                possibly_spurious: false
            }
            .is_success()
        );
        assert!(
            Outcome::KeptExisting {
                installed: "1.0".into(),
                reason: "offline".into()
            }
            .is_soft_success()
        );
    }

    #[test]
    fn test_batch_report_keeps_first_outcome() {
        let mut report = BatchReport::new(BatchKind::Core);
        report.record("A", Outcome::Installed { version: None });
        report.record(
            "A",
            Outcome::Failed {
                error: "late".into(),
                possibly_spurious: false,
            },
        );
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.success_map()["A"]);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&Outcome::AlreadySatisfied {
            installed: "2.0.0".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"already_satisfied","installed":"2.0.0"}"#);
    }
}
