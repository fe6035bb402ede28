use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modstrap")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Install PowerShell modules from a profile-driven manifest", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest file (default: ./modstrap.toml, then ~/.config/modstrap/)
    #[arg(short, long, global = true, env = "MODSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the selection, plan batches, and install
    Install(InstallArgs),

    /// Show what would be installed, and in which batches
    Plan(SelectionArgs),

    /// List profiles defined in the manifest
    Profiles,

    /// List services defined in the manifest
    Services,

    /// Compare installed versions against the selection
    Status(SelectionArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Selection
// ============================================================================

/// Which services to act on; a profile wins over a service list
#[derive(Args, Clone, Default)]
pub struct SelectionArgs {
    /// Profile name
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Comma-separated service names (e.g. graph,exchange)
    #[arg(short, long)]
    pub services: Option<String>,
}

// ============================================================================
// Install
// ============================================================================

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Reinstall even when the installed version is already satisfying
    #[arg(short, long)]
    pub force: bool,

    /// Unattended run: broadest profile, no prompts
    #[arg(long)]
    pub silent: bool,

    /// Ignore pinned versions and always install the newest
    #[arg(long)]
    pub skip_version_check: bool,

    /// Decide what would be installed without installing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}
