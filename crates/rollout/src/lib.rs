//! # Rollout
//!
//! Batched, idempotent installation of a resolved module set.
//!
//! The host shell keeps a bounded, process-wide command table. Installing
//! a large family of modules at once can exhaust it, so installs are
//! partitioned into ordered batches and applied strictly one at a time.
//!
//! ## Core Concepts
//!
//! - **Plan**: four batches in fixed order (`core`, `bulk-essential`,
//!   `bulk-remainder`, `service`), built by [`plan()`]
//! - **Outcome**: what happened to one module, including soft successes
//!   such as a module kept because its files were in use
//! - **Summary**: counts and failures aggregated per batch or per run
//!
//! ## Example
//!
//! ```no_run
//! use rollout::{AutoConfirm, InstallOptions, NoProgress, execute, plan};
//!
//! let manifest = manifest::load(std::path::Path::new("modstrap.toml"))?;
//! let resolution = manifest::resolve(&manifest, &manifest::Selection::Default)?;
//! let plan = plan(
//!     &resolution.modules,
//!     &manifest.settings.classification,
//!     &manifest.settings.capacity,
//! );
//!
//! let client = registrykit::Client::new()?;
//! let report = execute(
//!     &client,
//!     &plan,
//!     &InstallOptions::default(),
//!     &mut NoProgress,
//!     &mut AutoConfirm,
//! )?;
//! println!("{} of {} succeeded", report.summary().success_count, plan.total_modules());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles the pause between batches
//!
//! This allows the crate to be used without a hard dependency on any
//! terminal UI.

pub mod context;
pub mod installer;
pub mod planner;
pub mod summary;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use installer::{execute, install_batch, install_module};
pub use planner::{Batch, Plan, classify, plan};
pub use summary::{Failure, Summary, summarize};
pub use types::{BatchKind, BatchReport, InstallOptions, Outcome, PlannedModule, RunReport};
