//! Homebrew: the privileged system package manager.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{LinkReport, ManagerKind, ManagerState, PackageManager, require_ready};
use crate::catalog::{App, InstallContext};
use crate::error::ManagerError;
use crate::resources::download;

/// Official installer script.
const INSTALL_SCRIPT_URL: &str = "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Homebrew package manager.
#[derive(Debug)]
pub struct Homebrew<'a> {
    ctx: InstallContext<'a>,
    state: ManagerState,
    brew: Option<PathBuf>,
    prefixes: Vec<PathBuf>,
}

impl<'a> Homebrew<'a> {
    /// Create a manager in the `NotReady` state.
    #[must_use]
    pub fn new(ctx: InstallContext<'a>) -> Self {
        let prefixes = vec![
            PathBuf::from("/home/linuxbrew/.linuxbrew/bin/brew"),
            ctx.env.home_dir.join(".linuxbrew").join("bin").join("brew"),
            PathBuf::from("/opt/homebrew/bin/brew"),
            PathBuf::from("/usr/local/bin/brew"),
        ];
        Self {
            ctx,
            state: ManagerState::NotReady,
            brew: None,
            prefixes,
        }
    }

    #[cfg(test)]
    fn with_prefixes(mut self, prefixes: Vec<PathBuf>) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Resolve `brew`: search path first, then the standard install locations.
    fn locate(&self) -> Option<PathBuf> {
        self.ctx
            .executor
            .locate("brew")
            .or_else(|| self.prefixes.iter().find(|p| p.is_file()).cloned())
    }

    /// Download the official script and run it unattended.
    fn bootstrap(&self) -> Result<()> {
        if !self.ctx.env.has_elevated_access {
            self.ctx
                .log
                .warn("installing Homebrew normally requires elevated access");
        }
        self.ctx.log.info("installing Homebrew");
        let script = self.ctx.env.home_dir.join("homebrew-install.sh");
        download::download(self.ctx.executor, self.ctx.log, INSTALL_SCRIPT_URL, &script)?;
        let script_str = script.to_string_lossy();
        let result = self.ctx.executor.run_with_env(
            "bash",
            &[script_str.as_ref()],
            &[("NONINTERACTIVE", "1")],
        );
        let _ = std::fs::remove_file(&script);
        result.context("Homebrew install script failed")?;
        Ok(())
    }

    fn program(&self) -> String {
        self.brew
            .as_ref()
            .map_or_else(|| "brew".to_string(), |p| p.to_string_lossy().into_owned())
    }
}

impl PackageManager for Homebrew<'_> {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Homebrew
    }

    fn state(&self) -> ManagerState {
        self.state
    }

    fn ensure_available(&mut self) -> Result<()> {
        if self.state == ManagerState::Ready {
            return Ok(());
        }
        if let Some(path) = self.locate() {
            self.ctx
                .log
                .info(&format!("Homebrew found at {}", path.display()));
            self.brew = Some(path);
            self.state = ManagerState::Ready;
            return Ok(());
        }

        self.ctx.log.info("Homebrew not found");
        self.bootstrap().map_err(|e| ManagerError::Unavailable {
            manager: self.name().to_string(),
            reason: format!("{e:#}"),
        })?;

        // The installer does not update this process's PATH, so resolve again.
        let path = self.locate().ok_or_else(|| ManagerError::Unavailable {
            manager: self.name().to_string(),
            reason: "brew still not found after running the installer".to_string(),
        })?;
        self.ctx
            .log
            .info(&format!("Homebrew installed at {}", path.display()));
        self.brew = Some(path);
        self.state = ManagerState::Ready;
        Ok(())
    }

    fn install_packages(&self, apps: &[App], force: bool) -> Result<LinkReport> {
        require_ready(self.name(), self.state)?;
        if apps.is_empty() {
            return Ok(LinkReport::default());
        }

        let packages: Vec<String> = apps.iter().map(App::package_name).collect();
        self.ctx.log.info(&format!(
            "installing with Homebrew: {}",
            packages.join(", ")
        ));
        let mut args = vec!["install"];
        if force {
            args.push("--force");
        }
        args.extend(packages.iter().map(String::as_str));

        self.ctx
            .executor
            .run(&self.program(), &args)
            .map_err(|source| ManagerError::BatchInstall {
                manager: self.name().to_string(),
                packages: packages.clone(),
                source,
            })?;

        // Homebrew puts its binaries on the search path itself.
        Ok(LinkReport::default())
    }

    fn link_binary(&self, app: &App) -> Result<LinkReport> {
        require_ready(self.name(), self.state)?;
        self.ctx.log.warn(&format!(
            "Homebrew links its own binaries; nothing to link for {}",
            app.name()
        ));
        Ok(LinkReport::default())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentContext;
    use crate::logging::{Logger, isolated_logger};
    use crate::resources::test_helpers::MockExecutor;

    struct Fixture {
        log: Logger,
        env: EnvironmentContext,
        _home: tempfile::TempDir,
        _tmp: tempfile::TempDir,
        _guard: tracing::dispatcher::DefaultGuard,
    }

    fn fixture(elevated: bool) -> Fixture {
        let (log, tmp, guard) = isolated_logger();
        let home = tempfile::tempdir().unwrap();
        let env = EnvironmentContext::at_home(home.path().to_path_buf(), elevated, &log).unwrap();
        Fixture {
            log,
            env,
            _home: home,
            _tmp: tmp,
            _guard: guard,
        }
    }

    fn manager<'a>(f: &'a Fixture, mock: &'a MockExecutor) -> Homebrew<'a> {
        Homebrew::new(InstallContext {
            env: &f.env,
            executor: mock,
            log: &f.log,
        })
        .with_prefixes(vec![])
    }

    #[test]
    fn install_before_ready_is_not_ready_error() {
        let f = fixture(true);
        let mock = MockExecutor::new();
        let brew = manager(&f, &mock);
        let err = brew
            .install_packages(&[App::generic("ripgrep")], false)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::NotReady { .. })
        ));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn link_before_ready_is_not_ready_error() {
        let f = fixture(true);
        let mock = MockExecutor::new();
        let brew = manager(&f, &mock);
        assert!(brew.link_binary(&App::generic("fd")).is_err());
    }

    #[test]
    fn found_on_path_is_ready_without_bootstrap() {
        let f = fixture(true);
        let mock = MockExecutor::new().with_on_path(&["brew"]);
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        assert_eq!(brew.state(), ManagerState::Ready);
        assert!(mock.calls().is_empty());
        brew.ensure_available().unwrap();
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn bootstrap_runs_script_noninteractively_then_reverifies() {
        let f = fixture(true);
        let mock = MockExecutor::new()
            .with_on_path(&["curl"])
            .with_download(b"#!/bin/bash\n")
            .on_path_after("NONINTERACTIVE=1 bash", "brew");
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        assert_eq!(brew.state(), ManagerState::Ready);

        let calls = mock.calls();
        assert!(calls[0].starts_with("curl"));
        assert!(calls[0].ends_with(INSTALL_SCRIPT_URL));
        assert!(calls[1].starts_with("NONINTERACTIVE=1 bash "));
        assert!(!f.env.home_dir.join("homebrew-install.sh").exists());
    }

    #[test]
    fn bootstrap_without_brew_afterwards_is_unavailable() {
        let f = fixture(true);
        let mock = MockExecutor::new()
            .with_on_path(&["curl"])
            .with_download(b"#!/bin/bash\n");
        let mut brew = manager(&f, &mock);
        let err = brew.ensure_available().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::Unavailable { .. })
        ));
        assert_eq!(brew.state(), ManagerState::NotReady);
    }

    #[test]
    fn failed_installer_is_unavailable() {
        let f = fixture(true);
        let mock = MockExecutor::new()
            .with_on_path(&["curl"])
            .with_download(b"#!/bin/bash\n")
            .fail_when("NONINTERACTIVE");
        let mut brew = manager(&f, &mock);
        assert!(brew.ensure_available().is_err());
        assert_eq!(brew.state(), ManagerState::NotReady);
    }

    #[test]
    fn batch_install_is_one_command() {
        let f = fixture(true);
        let mock = MockExecutor::new().with_on_path(&["brew"]);
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        let apps = [App::generic("ripgrep"), App::generic("Git Delta")];
        let report = brew.install_packages(&apps, false).unwrap();
        assert_eq!(mock.calls(), vec!["/usr/bin/brew install ripgrep git-delta"]);
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn force_adds_force_flag() {
        let f = fixture(true);
        let mock = MockExecutor::new().with_on_path(&["brew"]);
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        brew.install_packages(&[App::generic("fd")], true).unwrap();
        assert_eq!(mock.calls(), vec!["/usr/bin/brew install --force fd"]);
    }

    #[test]
    fn link_binary_warns_and_links_nothing() {
        let f = fixture(true);
        let mock = MockExecutor::new().with_on_path(&["brew"]);
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        let report = brew.link_binary(&App::generic("fd")).unwrap();
        assert_eq!(report.total(), 0);
        assert!(f.env.user_local_bin.read_dir().unwrap().next().is_none());
        let contents = std::fs::read_to_string(f.log.log_path().expect("log path")).unwrap();
        assert!(
            contents.contains("[warn] Homebrew links its own binaries; nothing to link for fd")
        );
    }

    #[test]
    fn batch_install_does_not_warn_per_app() {
        let f = fixture(true);
        let mock = MockExecutor::new().with_on_path(&["brew"]);
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        let apps = [App::generic("fd"), App::generic("bat")];
        brew.install_packages(&apps, false).unwrap();
        let contents = std::fs::read_to_string(f.log.log_path().expect("log path")).unwrap();
        assert!(!contents.contains("nothing to link"));
    }

    #[test]
    fn batch_failure_is_batch_install_error() {
        let f = fixture(true);
        let mock = MockExecutor::new()
            .with_on_path(&["brew"])
            .fail_when("install");
        let mut brew = manager(&f, &mock);
        brew.ensure_available().unwrap();
        let err = brew
            .install_packages(&[App::generic("fd"), App::generic("bat")], false)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::BatchInstall { packages, .. }) if packages == &["fd", "bat"]
        ));
    }
}
