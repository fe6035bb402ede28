//! PowerShell runtime check
//!
//! Modules install fine under Windows PowerShell, but the newer `pwsh`
//! host is preferred. We only warn; relaunching under another host is
//! left to the operator.

use registrykit::backend::pwsh::{self, Host, HostKind};

use crate::ui;

/// Result of looking for a PowerShell host
#[derive(Debug)]
pub enum HostCheck {
    Preferred(Host),
    Fallback(Host),
    Missing,
}

impl HostCheck {
    fn from_host(host: Option<Host>) -> Self {
        match host {
            Some(h) if h.kind == HostKind::Pwsh => Self::Preferred(h),
            Some(h) => Self::Fallback(h),
            None => Self::Missing,
        }
    }

    /// One-line description for status output
    pub fn describe(&self) -> String {
        match self {
            Self::Preferred(h) => format!("pwsh ({})", h.path.display()),
            Self::Fallback(h) => format!("powershell ({}), pwsh not found", h.path.display()),
            Self::Missing => "not found".to_string(),
        }
    }
}

/// Look for a host on PATH
pub fn check() -> HostCheck {
    let check = HostCheck::from_host(pwsh::find_host());
    log::debug!("PowerShell host: {}", check.describe());
    check
}

/// Warn when only the fallback host is available
pub fn warn_if_fallback(check: &HostCheck, quiet: bool) {
    if quiet {
        return;
    }
    if let HostCheck::Fallback(_) = check {
        ui::warn("PowerShell 7 (pwsh) not found; using Windows PowerShell");
        ui::dim("Some modules require pwsh. Install it and rerun for best results.");
    }
}
