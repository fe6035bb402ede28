//! Real registry backend driving a PowerShell host (`pwsh` or `powershell`).
//!
//! Every call runs a short non-interactive script in a fresh host process
//! and reads its stdout. Failures are classified from stderr at this
//! boundary via [`Error::from_host_output`].

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::InstallRequest;
use crate::version::Version;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;

/// Which PowerShell flavour a host executable is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// PowerShell 7+ (`pwsh`), the preferred runtime
    Pwsh,
    /// Windows PowerShell 5.1 (`powershell`)
    WindowsPowerShell,
}

impl HostKind {
    fn executable(&self) -> &'static str {
        match self {
            HostKind::Pwsh => "pwsh",
            HostKind::WindowsPowerShell => "powershell",
        }
    }
}

/// A located PowerShell host.
#[derive(Debug, Clone)]
pub struct Host {
    /// Path to the executable
    pub path: PathBuf,
    /// Host flavour
    pub kind: HostKind,
}

/// Backend that executes real PowerShell commands.
pub struct PwshBackend {
    host: Host,
    repository: String,
}

impl PwshBackend {
    /// Create a backend using the best available host and the PSGallery repository.
    ///
    /// Returns an error if no PowerShell host is installed.
    pub fn new() -> Result<Self> {
        let host = find_host().ok_or(Error::HostNotFound)?;
        log::debug!("Using PowerShell host at {}", host.path.display());
        Ok(Self {
            host,
            repository: "PSGallery".to_string(),
        })
    }

    /// Run a script and return raw output.
    fn run_script(&self, script: &str) -> Result<std::process::Output> {
        let full = format!(
            "$ErrorActionPreference = 'Stop'; $ProgressPreference = 'SilentlyContinue'; {script}"
        );
        log::trace!("{} -Command {}", self.host.kind.executable(), full);
        Command::new(&self.host.path)
            .args(["-NoProfile", "-NonInteractive", "-Command", &full])
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute {}: {}", self.host.path.display(), e),
                stderr: String::new(),
            })
    }

    /// Run a script and check for success.
    fn run_checked(&self, script: &str, module_name: Option<&str>) -> Result<String> {
        let output = self.run_script(script)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_host_output(&stderr, module_name));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Backend for PwshBackend {
    fn is_available(&self) -> bool {
        self.run_script("$PSVersionTable.PSVersion.ToString()")
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn installed_version(&self, name: &str) -> Result<Option<Version>> {
        let script = format!(
            "Get-InstalledModule -Name {} -AllVersions -ErrorAction SilentlyContinue | \
             ForEach-Object {{ $_.Version.ToString() }}",
            quote(name)?
        );
        let stdout = self.run_checked(&script, Some(name))?;
        Ok(highest_version(&stdout))
    }

    fn find_latest(&self, name: &str) -> Result<Version> {
        let script = format!(
            "Find-Module -Name {} -Repository {} | Select-Object Name, Version | ConvertTo-Json -Compress",
            quote(name)?,
            quote(&self.repository)?
        );
        let stdout = self.run_checked(&script, Some(name))?;
        parse_found_module(&stdout, name)
    }

    fn install(&self, request: &InstallRequest) -> Result<()> {
        let script = install_script(request)?;
        self.run_checked(&script, Some(&request.name))?;
        Ok(())
    }

    fn is_loaded(&self, name: &str) -> Result<bool> {
        let script = format!("@(Get-Module -Name {}).Count", quote(name)?);
        let stdout = self.run_checked(&script, Some(name))?;
        Ok(stdout.trim().parse::<u32>().unwrap_or(0) > 0)
    }

    fn unload(&self, name: &str) -> Result<()> {
        let script = format!("Remove-Module -Name {} -Force", quote(name)?);
        self.run_checked(&script, Some(name))?;
        Ok(())
    }
}

/// Locate a PowerShell host on PATH, preferring `pwsh`.
pub fn find_host() -> Option<Host> {
    [HostKind::Pwsh, HostKind::WindowsPowerShell]
        .into_iter()
        .find_map(|kind| which::which(kind.executable()).ok().map(|path| Host { path, kind }))
}

/// Quote a value as a single-quoted PowerShell string literal.
fn quote(value: &str) -> Result<String> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !valid {
        return Err(Error::InvalidName(value.to_string()));
    }
    Ok(format!("'{value}'"))
}

fn install_script(request: &InstallRequest) -> Result<String> {
    let mut script = format!(
        "Install-Module -Name {} -Scope {}",
        quote(&request.name)?,
        request.scope.as_arg()
    );
    if let Some(version) = &request.pinned_version {
        script.push_str(&format!(" -RequiredVersion '{version}'"));
    }
    if request.allow_clobber {
        script.push_str(" -AllowClobber");
    }
    if request.force {
        script.push_str(" -Force");
    }
    Ok(script)
}

fn highest_version(stdout: &str) -> Option<Version> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| match l.parse::<Version>() {
            Ok(v) => Some(v),
            Err(_) => {
                log::debug!("Ignoring unparseable version line: {l}");
                None
            }
        })
        .max()
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FoundModule {
    version: String,
}

fn parse_found_module(stdout: &str, name: &str) -> Result<Version> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::NotFound {
            name: name.to_string(),
        });
    }

    // Several repositories can answer; ConvertTo-Json emits an array then
    let found: Vec<FoundModule> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        vec![serde_json::from_str(trimmed)?]
    };

    found
        .iter()
        .filter_map(|m| m.version.parse::<Version>().ok())
        .max()
        .ok_or_else(|| Error::InvalidVersion(trimmed.to_string()))
}
