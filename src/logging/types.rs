//! Core logging types: per-app entries, status, and the [`Log`] trait.

/// Final outcome of one requested app, for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// App name as requested.
    pub name: String,
    /// Final status of the app.
    pub status: AppStatus,
    /// Optional detail message (e.g. skip reason or error description).
    pub message: Option<String>,
}

/// Status of a resolved app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    /// Installed by a custom installer or the package manager.
    Installed,
    /// Already present; nothing was done.
    Skipped,
    /// Resolution ran in dry-run mode; no changes were applied.
    DryRun,
    /// Installation failed.
    Failed,
}

impl AppStatus {
    /// Short label used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// Resolution, managers and custom installers log through this trait so they
/// never depend on how output is rendered.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an app outcome for the summary.
    fn record_app(&self, name: &str, status: AppStatus, message: Option<&str>);
}
