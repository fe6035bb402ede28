//! JSON run report

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use manifest::Selection;
use rollout::{RunReport, Summary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Flags the run was started with
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunFlags {
    pub force: bool,
    pub silent: bool,
    pub dry_run: bool,
    pub skip_version_check: bool,
}

/// Everything recorded about one install run
#[derive(Debug, Serialize)]
pub struct RunRecord {
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub manifest: PathBuf,
    pub selection: Selection,
    pub services: Vec<String>,
    pub flags: RunFlags,
    #[serde(flatten)]
    pub run: RunReport,
    pub summary: Summary,
}

impl RunRecord {
    pub fn new(
        started_at: DateTime<Utc>,
        manifest: &Path,
        selection: Selection,
        services: Vec<String>,
        flags: RunFlags,
        run: RunReport,
    ) -> Self {
        let summary = run.summary();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            started_at,
            finished_at: Utc::now(),
            manifest: manifest.to_path_buf(),
            selection,
            services,
            flags,
            run,
            summary,
        }
    }
}

/// Write a report as pretty JSON, creating parent directories
pub fn write(path: &Path, record: &RunRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(record)?;
    fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))?;
    log::info!("Wrote run report to {}", path.display());
    Ok(())
}
