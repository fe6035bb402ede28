//! Progress and confirmation callbacks
//!
//! These traits allow the rollout crate to be used without depending on a
//! specific terminal UI.

use crate::planner::Batch;
use crate::types::{BatchReport, Outcome};
use anyhow::Result;
use manifest::VersionConstraint;

/// Progress callback for install operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called when starting a batch (`index` is 1-based over non-empty batches)
    fn on_batch_start(&mut self, batch: &Batch, index: usize, total: usize);

    /// Called when starting a single module
    fn on_module_start(&mut self, name: &str, version: &VersionConstraint);

    /// Called when a module's outcome is known
    fn on_module_complete(&mut self, name: &str, outcome: &Outcome);

    /// Called when a batch completes
    fn on_batch_complete(&mut self, report: &BatchReport);
}

/// Confirmation callback for user interaction
///
/// Implement this trait to handle user confirmations.
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _batch: &Batch, _index: usize, _total: usize) {}
    fn on_module_start(&mut self, _name: &str, _version: &VersionConstraint) {}
    fn on_module_complete(&mut self, _name: &str, _outcome: &Outcome) {}
    fn on_batch_complete(&mut self, _report: &BatchReport) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
