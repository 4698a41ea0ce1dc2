//! Miniforge (`mamba`): the user-space manager.
//!
//! Packages go into one named environment under the Miniforge prefix; their
//! executables are then symlinked into `~/.local/bin`.
use anyhow::{Context as _, Result};
use std::cell::Cell;
use std::path::{Path, PathBuf};

use super::{LinkReport, ManagerKind, ManagerState, PackageManager, require_ready};
use crate::catalog::{App, InstallContext};
use crate::error::ManagerError;
use crate::platform::{Arch, Os};
use crate::resources::link::BinaryLink;
use crate::resources::{Applicable as _, ResourceChange, download};

/// Release download base for the installer scripts.
const RELEASE_URL: &str = "https://github.com/conda-forge/miniforge/releases/latest/download";

/// Miniforge package manager.
#[derive(Debug)]
pub struct Miniforge<'a> {
    ctx: InstallContext<'a>,
    state: ManagerState,
    bin_path: Option<PathBuf>,
    env_name: String,
    candidates: Vec<PathBuf>,
    env_confirmed: Cell<bool>,
}

impl<'a> Miniforge<'a> {
    /// Create a manager in the `NotReady` state.
    ///
    /// `bin_path` is an explicit `mamba` binary; it is used when it exists.
    #[must_use]
    pub fn new(ctx: InstallContext<'a>, bin_path: Option<PathBuf>, env_name: &str) -> Self {
        let candidates = vec![
            default_prefix(&ctx.env.home_dir).join("bin").join("mamba"),
            PathBuf::from("/opt/miniforge3/bin/mamba"),
        ];
        Self {
            ctx,
            state: ManagerState::NotReady,
            bin_path,
            env_name: env_name.to_string(),
            candidates,
            env_confirmed: Cell::new(false),
        }
    }

    #[cfg(test)]
    fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Name of the isolated environment.
    #[must_use]
    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Resolved `mamba` binary, once ready.
    #[must_use]
    pub fn bin_path(&self) -> Option<&Path> {
        self.bin_path.as_deref()
    }

    fn mamba(&self) -> Result<String> {
        require_ready(self.name(), self.state)?;
        self.bin_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ManagerError::NotReady {
                    manager: self.name().to_string(),
                }
                .into()
            })
    }

    /// Installation prefix: two levels above `bin/mamba`.
    fn prefix(&self) -> Option<&Path> {
        self.bin_path
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
    }

    /// `bin` directory of the isolated environment.
    fn env_bin_dir(&self) -> Option<PathBuf> {
        self.prefix()
            .map(|p| p.join("envs").join(&self.env_name).join("bin"))
    }

    /// Download, verify and run the Miniforge installer in batch mode.
    fn bootstrap(&self) -> Result<PathBuf> {
        let os = Os::detect();
        let asset = format!(
            "Miniforge3-{}-{}.sh",
            os.miniforge_name(),
            Arch::detect().miniforge_name(os)
        );
        let url = format!("{RELEASE_URL}/{asset}");
        let prefix = default_prefix(&self.ctx.env.home_dir);
        let script = self.ctx.env.home_dir.join(&asset);

        self.ctx
            .log
            .info(&format!("installing Miniforge into {}", prefix.display()));
        download::download(self.ctx.executor, self.ctx.log, &url, &script)?;
        download::verify_checksum(
            self.ctx.executor,
            self.ctx.log,
            &format!("{url}.sha256"),
            &asset,
            &script,
        )?;

        let script_str = script.to_string_lossy();
        let prefix_str = prefix.to_string_lossy();
        let result = self
            .ctx
            .executor
            .run("bash", &[script_str.as_ref(), "-b", "-p", prefix_str.as_ref()]);
        let _ = std::fs::remove_file(&script);
        result.context("Miniforge installer failed")?;

        let mamba = prefix.join("bin").join("mamba");
        anyhow::ensure!(
            mamba.is_file(),
            "installer finished but {} does not exist",
            mamba.display()
        );
        Ok(mamba)
    }

    /// Whether the isolated environment shows up in `mamba env list`.
    fn env_exists(&self, mamba: &str) -> bool {
        match self.ctx.executor.run_unchecked(mamba, &["env", "list"]) {
            Ok(out) if out.success => env_listed(&out.stdout, &self.env_name),
            _ => {
                self.ctx
                    .log
                    .debug("could not list environments; assuming it is absent");
                false
            }
        }
    }

    /// Create the isolated environment unless it already exists.
    fn ensure_env(&self, mamba: &str) -> Result<()> {
        if self.env_confirmed.get() {
            return Ok(());
        }
        if self.env_exists(mamba) {
            self.ctx
                .log
                .debug(&format!("environment '{}' exists", self.env_name));
        } else {
            self.ctx
                .log
                .info(&format!("creating environment '{}'", self.env_name));
            self.ctx
                .executor
                .run(mamba, &["create", "-n", &self.env_name, "-y"])
                .map_err(|source| ManagerError::EnvironmentCreate {
                    manager: self.name().to_string(),
                    env: self.env_name.clone(),
                    source,
                })?;
        }
        self.env_confirmed.set(true);
        Ok(())
    }
}

impl PackageManager for Miniforge<'_> {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Miniforge
    }

    fn state(&self) -> ManagerState {
        self.state
    }

    fn ensure_available(&mut self) -> Result<()> {
        if self.state == ManagerState::Ready {
            return Ok(());
        }

        if let Some(path) = &self.bin_path {
            if path.is_file() {
                self.ctx
                    .log
                    .debug(&format!("using mamba at {}", path.display()));
                self.state = ManagerState::Ready;
                return Ok(());
            }
            self.ctx.log.warn(&format!(
                "configured mamba binary {} does not exist; searching",
                path.display()
            ));
        }

        if let Some(found) = self.candidates.iter().find(|p| p.is_file()).cloned() {
            self.ctx
                .log
                .info(&format!("Miniforge found at {}", found.display()));
            self.bin_path = Some(found);
            self.state = ManagerState::Ready;
            return Ok(());
        }

        self.ctx.log.info("Miniforge not found");
        let mamba = self.bootstrap().map_err(|e| ManagerError::Unavailable {
            manager: self.name().to_string(),
            reason: format!("{e:#}"),
        })?;
        self.ctx
            .log
            .info(&format!("Miniforge installed at {}", mamba.display()));
        self.bin_path = Some(mamba);
        self.state = ManagerState::Ready;
        Ok(())
    }

    fn install_packages(&self, apps: &[App], force: bool) -> Result<LinkReport> {
        let mamba = self.mamba()?;
        if apps.is_empty() {
            return Ok(LinkReport::default());
        }
        self.ensure_env(&mamba)?;

        let packages: Vec<String> = apps.iter().map(App::package_name).collect();
        self.ctx.log.info(&format!(
            "installing into '{}': {}",
            self.env_name,
            packages.join(", ")
        ));
        let mut args = vec!["install", "-n", self.env_name.as_str(), "-y"];
        if force {
            args.push("--force-reinstall");
        }
        args.extend(packages.iter().map(String::as_str));

        self.ctx
            .executor
            .run(&mamba, &args)
            .map_err(|source| ManagerError::BatchInstall {
                manager: self.name().to_string(),
                packages: packages.clone(),
                source,
            })?;

        let mut report = LinkReport::default();
        for app in apps {
            report.merge(self.link_binary(app)?);
        }
        Ok(report)
    }

    fn link_binary(&self, app: &App) -> Result<LinkReport> {
        require_ready(self.name(), self.state)?;
        let Some(source_dir) = self.env_bin_dir() else {
            return Err(ManagerError::NotReady {
                manager: self.name().to_string(),
            }
            .into());
        };

        let mut report = LinkReport::default();
        for command in app.commands() {
            let link = BinaryLink::for_command(&source_dir, &self.ctx.env.user_local_bin, command);
            match link.apply() {
                Ok(ResourceChange::Applied) => {
                    self.ctx.log.info(&format!("linked {}", link.description()));
                    report.linked.push(command.clone());
                }
                Ok(ResourceChange::AlreadyCorrect) => {
                    self.ctx.log.debug(&format!(
                        "{} already exists, not linking",
                        link.target.display()
                    ));
                    report.present.push(command.clone());
                }
                Ok(ResourceChange::Skipped { reason }) => {
                    self.ctx
                        .log
                        .warn(&format!("not linking {command} for {}: {reason}", app.name()));
                    report.skipped.push(command.clone());
                }
                Err(e) => {
                    self.ctx.log.error(&format!("{e:#}"));
                    report.failed.push(command.clone());
                }
            }
        }
        Ok(report)
    }
}

/// `<home>/miniforge3`.
fn default_prefix(home: &Path) -> PathBuf {
    home.join("miniforge3")
}

/// Whether `name` appears in `mamba env list` output.
///
/// Rows are `<name> [*] <path>`; unnamed environments show only a path, in
/// which case its last component is compared.
fn env_listed(listing: &str, name: &str) -> bool {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_whitespace().next())
        .any(|first| {
            first == name
                || (first.starts_with('/')
                    && Path::new(first).file_name().is_some_and(|f| f == name))
        })
}
