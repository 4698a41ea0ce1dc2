//! Command-line interface definitions.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "appstrap",
    about = "Install developer applications through Homebrew or a Miniforge environment",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install applications
    Install(InstallOpts),
    /// List the package managers and the one auto mode would pick
    Managers,
    /// Print the effective application catalog
    Catalog(CatalogOpts),
    /// Make sure git is installed
    EnsureGit,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Managers => "managers",
            Self::Catalog(_) => "catalog",
            Self::EnsureGit => "ensure-git",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Applications to install
    pub apps: Vec<String>,

    /// Install every app in a list (repeatable; `full` selects every list)
    #[arg(short = 'a', long = "app-list", value_name = "NAME")]
    pub app_lists: Vec<String>,

    /// Package manager: auto, brew or miniforge
    #[arg(long)]
    pub mode: Option<String>,

    /// Reinstall apps that are already present
    #[arg(short = 'f', long)]
    pub force_reinstall: bool,

    /// Path to the mamba binary (Miniforge only)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub custom_bin_path: Option<PathBuf>,

    /// Configuration sources.
    #[command(flatten)]
    pub sources: SourceOpts,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Where configuration is read from.
#[derive(Parser, Debug, Clone, Default)]
pub struct SourceOpts {
    /// Directory holding the app lists and commands.json
    #[arg(long, value_name = "DIR")]
    pub lists_dir: Option<PathBuf>,

    /// Settings file (default: ~/.config/appstrap/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Options for the `catalog` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CatalogOpts {
    /// Configuration sources.
    #[command(flatten)]
    pub sources: SourceOpts,
}
