//! Structured logger with dry-run awareness and per-app summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{APP_TARGET, DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{AppEntry, AppStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages are emitted as [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them on the
/// console and appends them to `$XDG_CACHE_HOME/appstrap/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    apps: Mutex<Vec<AppEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// written by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            apps: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            apps: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record an app outcome for the summary.
    pub fn record_app(&self, name: &str, status: AppStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.apps.lock() {
            guard.push(AppEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a copy of every recorded app entry, in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<AppEntry> {
        self.apps.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Names of the apps recorded with `status`, in recording order.
    #[must_use]
    pub fn names_with(&self, status: AppStatus) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.status == status)
            .map(|e| e.name)
            .collect()
    }

    /// Count the number of failed apps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.apps.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == AppStatus::Failed)
                .count()
        })
    }

    /// Return `true` if any recorded app has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Print the summary of all recorded apps: one line per app, then the
    /// totals and the identities of installed, skipped and failed apps.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        for entry in &entries {
            tracing::info!(
                target: APP_TARGET,
                app = %entry.name,
                status = entry.status.label(),
                "{}",
                entry.message.as_deref().unwrap_or_default()
            );
        }

        let count = |status| entries.iter().filter(|e| e.status == status).count();
        let installed = count(AppStatus::Installed);
        let skipped = count(AppStatus::Skipped);
        let dry_run = count(AppStatus::DryRun);
        let failed = count(AppStatus::Failed);
        self.info(&format!(
            "{} apps: {installed} installed, {skipped} skipped, {dry_run} dry-run, {failed} failed",
            entries.len()
        ));

        for status in [AppStatus::Installed, AppStatus::Skipped, AppStatus::Failed] {
            let names = self.names_with(status);
            if !names.is_empty() {
                self.info(&format!("{}: {}", status.label(), names.join(", ")));
            }
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_app(&self, name: &str, status: AppStatus, message: Option<&str>) {
        self.record_app(name, status, message);
    }
}
