//! Command: make sure git is installed.
use anyhow::{Context as _, Result};

use crate::error::PlatformError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::platform::{Distro, Os};

/// Run the ensure-git command.
///
/// # Errors
///
/// Returns an error if git is missing and cannot be installed.
pub fn run(log: &Logger) -> Result<()> {
    ensure_git(&SystemExecutor, log)
}

/// Report git's version, installing it first on Linux when it is missing.
///
/// # Errors
///
/// Returns [`PlatformError::Unsupported`] off Linux or on an unrecognised
/// distribution, and an error if installation fails.
pub fn ensure_git(executor: &dyn Executor, log: &dyn Log) -> Result<()> {
    log.stage("Checking git");
    if executor.which("git") {
        report_version(executor, log);
        return Ok(());
    }

    let os = Os::detect();
    if os != Os::Linux {
        return Err(PlatformError::Unsupported {
            operation: "installing git".to_string(),
            platform: os.to_string(),
        }
        .into());
    }
    let distro = Distro::detect(executor);
    log.info(&format!("git not found; detected {distro} distribution"));
    install_git(executor, log, distro)
}

/// Install git with `distro`'s package tool through `sudo`, then re-check.
///
/// # Errors
///
/// Returns [`PlatformError::Unsupported`] for an unknown distribution, the
/// failing command's error, or [`PlatformError::StillMissing`] when git is
/// still not found afterwards.
pub fn install_git(executor: &dyn Executor, log: &dyn Log, distro: Distro) -> Result<()> {
    let commands = distro.git_install_commands(executor);
    if commands.is_empty() {
        return Err(PlatformError::Unsupported {
            operation: "installing git".to_string(),
            platform: distro.to_string(),
        }
        .into());
    }

    for args in &commands {
        let line = args.join(" ");
        log.info(&format!("sudo {line}"));
        executor
            .run("sudo", args)
            .with_context(|| format!("running sudo {line}"))?;
    }

    if !executor.which("git") {
        return Err(PlatformError::StillMissing("git".to_string()).into());
    }
    report_version(executor, log);
    Ok(())
}

fn report_version(executor: &dyn Executor, log: &dyn Log) {
    match executor.run("git", &["--version"]) {
        Ok(out) if !out.stdout.trim().is_empty() => log.info(out.stdout.trim()),
        _ => log.info("git is installed"),
    }
}
