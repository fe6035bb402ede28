//! Progress indicators and prompts for modstrap CLI.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use manifest::VersionConstraint;
use rollout::{Batch, BatchReport, ConfirmCallback, Outcome, ProgressCallback};
use std::time::Duration;

use crate::ui;

/// Create a spinner with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Console progress for an install run
///
/// Shows a spinner while a module installs (only on a terminal), then
/// one line per module outcome. In quiet mode only failures are printed.
pub struct ConsoleProgress {
    quiet: bool,
    interactive: bool,
    current: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: console::user_attended(),
            current: None,
        }
    }

    fn clear(&mut self) {
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_batch_start(&mut self, batch: &Batch, index: usize, total: usize) {
        if self.quiet {
            return;
        }
        println!();
        ui::step(
            index,
            total,
            &format!("{} ({} modules)", batch.kind.description(), batch.len()),
        );
    }

    fn on_module_start(&mut self, name: &str, version: &VersionConstraint) {
        if self.interactive && !self.quiet {
            self.current = Some(spinner(&format!("{name} {version}")));
        }
    }

    fn on_module_complete(&mut self, name: &str, outcome: &Outcome) {
        self.clear();
        if !self.quiet || !outcome.is_success() {
            ui::outcome(name, outcome);
        }
    }

    fn on_batch_complete(&mut self, report: &BatchReport) {
        self.clear();
        if !self.quiet {
            ui::dim(&ui::summary_line(&report.summary()));
        }
    }
}

/// Interactive confirmation via a terminal prompt
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .context("Failed to read confirmation")
    }
}
