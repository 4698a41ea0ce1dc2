//! Install flow: resolve each requested app, run custom installers, then
//! hand the remaining apps to the selected package manager in one batch.
//!
//! Every requested name ends up recorded through [`Log::record_app`] as
//! installed, skipped, dry-run or failed.
use anyhow::Result;

use crate::catalog::{App, AppCatalog, InstallContext};
use crate::logging::{AppStatus, Log};
use crate::managers::{self, LinkReport, ManagerKind, ManagerOptions, Mode};

/// Options for one install run.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Reinstall apps that are already present.
    pub force: bool,
    /// Resolve and log the plan without installing anything.
    pub dry_run: bool,
    /// Manager selection mode.
    pub mode: Mode,
    /// Construction options for the selected manager.
    pub manager: ManagerOptions,
}

/// What happened to one requested app during resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Already installed; nothing to do.
    Skipped,
    /// Installed (or planned, in dry-run) by its custom installer.
    Handled,
    /// Left for the package manager.
    Enqueued(App),
}

/// Result of a completed run.
#[derive(Debug, Default)]
pub struct InstallOutcome {
    /// The manager used, if any app reached the batch stage.
    pub manager: Option<ManagerKind>,
    /// Apps handed to the manager, in request order.
    pub queued: Vec<App>,
    /// Links created by the manager.
    pub links: LinkReport,
}

impl InstallOutcome {
    /// Package names of the queued apps.
    #[must_use]
    pub fn queued_packages(&self) -> Vec<String> {
        self.queued.iter().map(App::package_name).collect()
    }
}

/// Drives one install run.
#[derive(Debug)]
pub struct Orchestrator<'a> {
    catalog: &'a AppCatalog,
    ctx: InstallContext<'a>,
    options: InstallOptions,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator.
    #[must_use]
    pub const fn new(catalog: &'a AppCatalog, ctx: InstallContext<'a>, options: InstallOptions) -> Self {
        Self {
            catalog,
            ctx,
            options,
        }
    }

    fn log(&self) -> &'a dyn Log {
        self.ctx.log
    }

    /// Manager this run would use.
    #[must_use]
    pub const fn selected_manager(&self) -> ManagerKind {
        self.options.mode.select(self.ctx.env)
    }

    /// Resolve one requested name.
    ///
    /// Catalog misses become generic apps. An installed app is skipped
    /// unless forcing. A custom installer runs first; if it fails the app
    /// falls back to the package manager.
    pub fn resolve(&self, name: &str) -> Resolution {
        let hit = self.catalog.lookup(name);
        let known = hit.is_some();
        let app = hit.unwrap_or_else(|| App::generic(name.trim()));

        if !self.options.force && app.is_installed(self.ctx.executor) {
            self.log().info(&format!(
                "{} already installed ({} found)",
                app.name(),
                app.primary_command()
            ));
            self.log()
                .record_app(app.name(), AppStatus::Skipped, Some("already installed"));
            return Resolution::Skipped;
        }

        if let Some(install) = app.custom_install() {
            if self.options.dry_run {
                self.log()
                    .dry_run(&format!("would run the custom installer for {}", app.name()));
                self.log()
                    .record_app(app.name(), AppStatus::DryRun, Some("custom installer"));
                return Resolution::Handled;
            }
            self.log()
                .info(&format!("running custom installer for {}", app.name()));
            match install(&self.ctx, self.options.force) {
                Ok(()) => {
                    self.log()
                        .record_app(app.name(), AppStatus::Installed, Some("custom installer"));
                    return Resolution::Handled;
                }
                Err(e) => self.log().warn(&format!(
                    "custom installer for {} failed, falling back to package manager: {e:#}",
                    app.name()
                )),
            }
        } else if !known {
            self.log().debug(&format!(
                "{} is not in the catalog; expecting command '{}'",
                app.name(),
                app.primary_command()
            ));
        }

        Resolution::Enqueued(app)
    }

    /// Resolve every name and install the queue in one batch.
    ///
    /// An empty queue succeeds without touching any manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected manager is unavailable or the batch
    /// install fails; every queued app is then recorded as failed.
    pub fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<InstallOutcome> {
        self.log().stage(&format!("Resolving {} apps", names.len()));
        let queue: Vec<App> = names
            .iter()
            .filter_map(|name| match self.resolve(name.as_ref()) {
                Resolution::Enqueued(app) => Some(app),
                Resolution::Skipped | Resolution::Handled => None,
            })
            .collect();

        if queue.is_empty() {
            self.log().info("nothing to install");
            return Ok(InstallOutcome::default());
        }

        let kind = self.selected_manager();
        self.log().info(&format!(
            "using {kind} (mode {}, elevated access: {})",
            self.options.mode, self.ctx.env.has_elevated_access
        ));

        if self.options.dry_run {
            for app in &queue {
                self.log()
                    .dry_run(&format!("would install {} with {kind}", app.package_name()));
                self.log()
                    .record_app(app.name(), AppStatus::DryRun, Some(kind.name()));
            }
            return Ok(InstallOutcome {
                manager: Some(kind),
                queued: queue,
                links: LinkReport::default(),
            });
        }

        self.log()
            .stage(&format!("Installing {} apps with {kind}", queue.len()));
        let mut manager = managers::create(kind, self.ctx, &self.options.manager);
        let result = manager
            .ensure_available()
            .and_then(|()| manager.install_packages(&queue, self.options.force));

        match result {
            Ok(links) => {
                for app in &queue {
                    self.log()
                        .record_app(app.name(), AppStatus::Installed, Some(kind.name()));
                }
                Ok(InstallOutcome {
                    manager: Some(kind),
                    queued: queue,
                    links,
                })
            }
            Err(e) => {
                let reason = format!("{e:#}");
                self.log().error(&reason);
                for app in &queue {
                    self.log()
                        .record_app(app.name(), AppStatus::Failed, Some(&reason));
                }
                Err(e)
            }
        }
    }
}
