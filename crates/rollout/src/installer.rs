//! Installer - applies a plan module by module
//!
//! Execution is strictly sequential: one install attempt finishes before
//! the next starts, and no module is ever installed concurrently with
//! another. A module's failure is recorded and never stops the batch or
//! the run; each module gets exactly one attempt.

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::planner::{Batch, Plan};
use crate::types::{BatchReport, InstallOptions, Outcome, RunReport};
use anyhow::Result;
use manifest::{VersionCheckPolicy, VersionConstraint};
use registrykit::{Client, ErrorKind, InstallRequest, Version};
use std::thread;

/// Execute a plan with the given options and callbacks
///
/// Empty batches are skipped. Between non-empty batches, and between the
/// groups of a batch, the configured delay is applied and, if enabled, the
/// operator is asked to continue. Declining stops the run; the report
/// records where.
pub fn execute<P, C>(
    client: &Client,
    plan: &Plan,
    opts: &InstallOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<RunReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let batches: Vec<&Batch> = plan.non_empty().collect();
    let total = batches.len();
    let mut report = RunReport::default();

    for (i, batch) in batches.into_iter().enumerate() {
        if i > 0 {
            let prompt = format!(
                "Continue with {} ({} modules)?",
                batch.kind.description().to_lowercase(),
                batch.len()
            );
            if !pace(opts, confirm, &prompt, &format!("batch '{}'", batch.name()))? {
                report.stopped_before = Some(batch.kind);
                break;
            }
        }

        progress.on_batch_start(batch, i + 1, total);
        let batch_report = install_batch(client, batch, opts, progress, confirm)?;
        progress.on_batch_complete(&batch_report);
        let stopped = batch_report.stopped;
        report.batches.push(batch_report);
        if stopped {
            report.stopped_before = Some(batch.kind);
            break;
        }
    }

    Ok(report)
}

/// Install every module of a batch, group by group
///
/// A group boundary is a registration checkpoint: the delay and the
/// pause apply between groups exactly as they do between batches.
pub fn install_batch<P, C>(
    client: &Client,
    batch: &Batch,
    opts: &InstallOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<BatchReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut report = BatchReport::new(batch.kind);
    let groups = batch.groups.len();

    for (g, group) in batch.groups.iter().enumerate() {
        if g > 0 {
            let prompt = format!(
                "Continue with {} group {}/{} ({} modules)?",
                batch.name(),
                g + 1,
                groups,
                group.len()
            );
            let what = format!("group {}/{} of batch '{}'", g + 1, groups, batch.name());
            if !pace(opts, confirm, &prompt, &what)? {
                report.stopped = true;
                break;
            }
        }
        if groups > 1 {
            log::debug!(
                "Batch '{}' group {}/{} ({} modules)",
                batch.name(),
                g + 1,
                groups,
                group.len()
            );
        }
        for module in group {
            progress.on_module_start(&module.name, &module.version);
            let outcome = install_module(client, &module.name, &module.version, opts);
            progress.on_module_complete(&module.name, &outcome);
            report.record(&module.name, outcome);
        }
    }

    Ok(report)
}

/// Checkpoint between batches or groups; returns `false` when declined
fn pace<C: ConfirmCallback>(
    opts: &InstallOptions,
    confirm: &mut C,
    prompt: &str,
    what: &str,
) -> Result<bool> {
    if opts.pause_between_batches && !confirm.confirm(prompt)? {
        log::info!("Stopped before {what}");
        return Ok(false);
    }
    if !opts.batch_delay.is_zero() && !opts.dry_run {
        log::debug!("Waiting {:?} before {what}", opts.batch_delay);
        thread::sleep(opts.batch_delay);
    }
    Ok(true)
}

/// Install a single module idempotently
///
/// Order of work: unload if loaded (best effort), decide whether the
/// installed version already satisfies the request, install, classify.
pub fn install_module(
    client: &Client,
    name: &str,
    constraint: &VersionConstraint,
    opts: &InstallOptions,
) -> Outcome {
    let requested = match constraint.literal().map(str::parse::<Version>).transpose() {
        Ok(v) => v,
        Err(e) => {
            return Outcome::Failed {
                error: e.to_string(),
                possibly_spurious: false,
            };
        }
    };

    if !opts.dry_run {
        unload_if_loaded(client, name);
    }

    if !opts.force && !opts.skip_version_check {
        if let Some(outcome) = check_installed(client, name, requested.as_ref(), opts) {
            return outcome;
        }
    }

    let pinned = if opts.skip_version_check {
        None
    } else {
        requested
    };

    if opts.dry_run {
        return Outcome::WouldInstall {
            version: pinned.map(|v| v.to_string()),
        };
    }

    let mut request = InstallRequest::new(name)
        .with_scope(opts.scope)
        .with_force(opts.force || opts.automated);
    if let Some(version) = pinned.clone() {
        request = request.with_version(version);
    }

    match client.install(&request) {
        Ok(()) => Outcome::Installed {
            version: pinned.map(|v| v.to_string()),
        },
        Err(e) => {
            let kind = e.kind();
            if kind.is_soft() {
                log::warn!("{name} is in use; keeping the existing version");
                return Outcome::InUse {
                    message: e.to_string(),
                };
            }
            log::info!("{name}: {}. {}", kind.description(), kind.advice());
            Outcome::Failed {
                error: e.to_string(),
                possibly_spurious: kind == ErrorKind::Untrusted && (opts.automated || opts.force),
            }
        }
    }
}

fn unload_if_loaded(client: &Client, name: &str) {
    match client.is_loaded(name) {
        Ok(true) => match client.unload(name) {
            Ok(()) => log::debug!("Unloaded {name} before install"),
            // A loaded module can often still be updated
            Err(e) => log::warn!("Could not unload {name}: {e}"),
        },
        Ok(false) => {}
        Err(e) => log::debug!("Could not check whether {name} is loaded: {e}"),
    }
}

/// Returns an outcome when no install should happen
fn check_installed(
    client: &Client,
    name: &str,
    requested: Option<&Version>,
    opts: &InstallOptions,
) -> Option<Outcome> {
    let installed = match client.installed_version(name) {
        Ok(v) => v?,
        Err(e) => {
            log::debug!("Could not query installed version of {name}: {e}");
            return None;
        }
    };

    let target = match requested {
        Some(min) => min.clone(),
        None => match client.find_latest(name) {
            Ok(latest) => latest,
            Err(e) => {
                return Some(match opts.on_version_check_failure {
                    VersionCheckPolicy::KeepExisting => {
                        log::warn!("Could not check newest version of {name}: {e}");
                        Outcome::KeptExisting {
                            installed: installed.to_string(),
                            reason: e.to_string(),
                        }
                    }
                    VersionCheckPolicy::Abort => Outcome::Failed {
                        error: format!("version check failed: {e}"),
                        possibly_spurious: false,
                    },
                });
            }
        },
    };

    if installed.satisfies(&target) {
        log::debug!("{name} {installed} satisfies {target}, skipping");
        Some(Outcome::AlreadySatisfied {
            installed: installed.to_string(),
        })
    } else {
        log::debug!("{name} {installed} is older than {target}");
        None
    }
}
