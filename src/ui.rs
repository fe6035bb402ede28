use colored::Colorize;
use rollout::{Outcome, Summary};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

// ============================================================================
// Outcomes
// ============================================================================

/// Plain-text detail for an outcome, without the module name
pub fn outcome_detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Installed { version: Some(v) } => format!("installed {v}"),
        Outcome::Installed { version: None } => "installed newest".to_string(),
        Outcome::AlreadySatisfied { installed } => format!("up to date ({installed})"),
        Outcome::KeptExisting { installed, reason } => {
            format!("kept {installed}, could not check for updates: {reason}")
        }
        Outcome::InUse { .. } => "in use, existing version kept".to_string(),
        Outcome::WouldInstall { version: Some(v) } => format!("would install {v}"),
        Outcome::WouldInstall { version: None } => "would install newest".to_string(),
        Outcome::Failed {
            error,
            possibly_spurious: true,
        } => format!("{error} (may be spurious under automation)"),
        Outcome::Failed { error, .. } => error.clone(),
    }
}

/// Print one module's outcome line
pub fn outcome(name: &str, outcome: &Outcome) {
    let detail = outcome_detail(outcome);
    match outcome {
        Outcome::Failed { .. } => println!("  {} {} {}", "✗".red(), name, detail.red()),
        Outcome::InUse { .. } | Outcome::KeptExisting { .. } => {
            println!("  {} {} {}", "⚠".yellow(), name, detail.yellow());
        }
        Outcome::AlreadySatisfied { .. } => {
            println!("  {} {} {}", "✓".green(), name, detail.dimmed());
        }
        Outcome::WouldInstall { .. } => println!("  {} {} {}", "→".cyan(), name, detail),
        Outcome::Installed { .. } => println!("  {} {} {}", "✓".green(), name, detail),
    }
}

/// One-line count summary, e.g. "3/4 succeeded, 1 failed"
pub fn summary_line(summary: &Summary) -> String {
    let mut line = format!("{}/{} succeeded", summary.success_count, summary.count);
    if summary.skipped_count > 0 {
        line.push_str(&format!(", {} already up to date", summary.skipped_count));
    }
    if summary.soft_count > 0 {
        line.push_str(&format!(", {} kept existing", summary.soft_count));
    }
    if summary.fail_count > 0 {
        line.push_str(&format!(", {} failed", summary.fail_count));
    }
    line
}

/// Print a summary block with every failure and its error text
pub fn summary(title: &str, summary: &Summary) {
    let line = summary_line(summary);
    println!();
    if summary.is_success() {
        println!("  {} {}: {}", "✓".green().bold(), title, line);
    } else {
        println!("  {} {}: {}", "⚠".yellow().bold(), title, line);
    }

    for failure in &summary.failed {
        let note = if failure.possibly_spurious {
            " (possibly spurious)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("    • {} {}{}", failure.name.red(), failure.error, note);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rollout::summarize;
    use std::collections::BTreeMap;

    #[test]
    fn test_outcome_detail() {
        assert_eq!(
            outcome_detail(&Outcome::Installed {
                version: Some("1.2.0".into())
            }),
            "installed 1.2.0"
        );
        assert_eq!(
            outcome_detail(&Outcome::AlreadySatisfied {
                installed: "2.0.0".into()
            }),
            "up to date (2.0.0)"
        );
        assert_eq!(
            outcome_detail(&Outcome::Failed {
                error: "untrusted".into(),
                possibly_spurious: true
            }),
            "untrusted (may be spurious under automation)"
        );
    }

    #[test]
    fn test_summary_line() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("A".to_string(), Outcome::Installed { version: None });
        outcomes.insert(
            "B".to_string(),
            Outcome::AlreadySatisfied {
                installed: "1.0".into(),
            },
        );
        outcomes.insert(
            "C".to_string(),
            Outcome::Failed {
                error: "boom".into(),
                possibly_spurious: false,
            },
        );

        let line = summary_line(&summarize(&outcomes));
        assert_eq!(line, "2/3 succeeded, 1 already up to date, 1 failed");
    }

    #[test]
    fn test_summary_line_all_ok() {
        let outcomes: BTreeMap<String, Outcome> = BTreeMap::new();
        assert_eq!(summary_line(&summarize(&outcomes)), "0/0 succeeded");
    }
}
