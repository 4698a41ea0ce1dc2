//! Environment probe: elevated access, home directory and user-local bin.
use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};

use crate::exec::Executor;
use crate::logging::Log;

/// Facts about the machine every component needs for one run.
///
/// Immutable after construction. `user_local_bin` exists on disk once a
/// context has been produced by [`EnvironmentContext::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    /// Whether `sudo` can run a command on this machine.
    pub has_elevated_access: bool,
    /// The user's home directory.
    pub home_dir: PathBuf,
    /// `<home>/.local/bin`, where user-space binaries are linked.
    pub user_local_bin: PathBuf,
}

impl EnvironmentContext {
    /// Probe the machine.
    ///
    /// Elevated access is the exit status of `sudo true`; a missing `sudo`
    /// or a non-zero exit means no elevated access. The home directory comes
    /// from `HOME`.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or empty, or if
    /// `<home>/.local/bin` cannot be created.
    pub fn detect(executor: &dyn Executor, log: &dyn Log) -> Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from);
        let Some(home_dir) = home else {
            bail!("cannot determine home directory: HOME is not set");
        };
        let has_elevated_access = probe_elevated_access(executor);
        log.debug(&format!("elevated access: {has_elevated_access}"));
        Self::at_home(home_dir, has_elevated_access, log)
    }

    /// Build a context rooted at `home_dir`, creating `<home>/.local/bin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bin directory cannot be created.
    pub fn at_home(home_dir: PathBuf, has_elevated_access: bool, log: &dyn Log) -> Result<Self> {
        let user_local_bin = home_dir.join(".local").join("bin");
        ensure_bin_dir(&user_local_bin, log)?;
        Ok(Self {
            has_elevated_access,
            home_dir,
            user_local_bin,
        })
    }
}

/// Run `sudo true`; anything but a clean exit means no elevated access.
#[must_use]
pub fn probe_elevated_access(executor: &dyn Executor) -> bool {
    if !executor.which("sudo") {
        return false;
    }
    executor
        .run_unchecked("sudo", &["true"])
        .is_ok_and(|r| r.success)
}

fn ensure_bin_dir(dir: &Path, log: &dyn Log) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    log.info(&format!("creating {}", dir.display()));
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}
