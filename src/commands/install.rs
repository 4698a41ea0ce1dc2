//! Command: install the requested applications.
use anyhow::Result;
use std::path::Path;

use super::CommandSetup;
use crate::catalog::InstallContext;
use crate::cli::InstallOpts;
use crate::config::Settings;
use crate::config::app_list;
use crate::environment::EnvironmentContext;
use crate::error::ConfigError;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::managers::{ManagerOptions, Mode};
use crate::orchestrator::{InstallOptions, Orchestrator};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the environment cannot be
/// probed, the manager is unavailable, the batch install fails, or any app
/// ends up failed.
pub fn run(opts: &InstallOpts, log: &Logger) -> Result<()> {
    let executor = SystemExecutor;
    log.info(&format!("appstrap {}", super::version::version()));

    let setup = CommandSetup::init(&opts.sources, log)?;
    let names = requested_apps(opts, setup.lists_dir.as_deref())?;
    let options = install_options(opts, &setup.settings)?;
    if options.dry_run {
        log.dry_run("no changes will be made");
    }

    log.stage("Probing environment");
    let env = EnvironmentContext::detect(&executor, log)?;
    log.info(&format!(
        "elevated access: {}",
        if env.has_elevated_access { "yes" } else { "no" }
    ));

    let ctx = InstallContext {
        env: &env,
        executor: &executor,
        log,
    };
    let result = Orchestrator::new(&setup.catalog, ctx, options).run(&names);

    log.print_summary();
    result?;

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} app(s) failed");
    }
    Ok(())
}

/// Names to install: the requested lists in order, then the positionals.
///
/// # Errors
///
/// Returns [`ConfigError::NothingRequested`] when neither is given,
/// [`ConfigError::ListsDirNotFound`] when lists are requested but no lists
/// directory exists, and any error from loading the lists.
pub fn requested_apps(opts: &InstallOpts, lists_dir: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    if opts.apps.is_empty() && opts.app_lists.is_empty() {
        return Err(ConfigError::NothingRequested);
    }
    let mut names = Vec::new();
    if !opts.app_lists.is_empty() {
        let dir = lists_dir.ok_or(ConfigError::ListsDirNotFound)?;
        names.extend(app_list::load_lists(dir, &opts.app_lists)?);
    }
    names.extend(opts.apps.iter().cloned());
    Ok(names)
}

/// Merge CLI flags over the settings file.
///
/// # Errors
///
/// Returns an error if the mode (from either source) is not a registered
/// manager or `auto`.
pub fn install_options(opts: &InstallOpts, settings: &Settings) -> Result<InstallOptions> {
    let mode = opts
        .mode
        .as_deref()
        .or(settings.mode.as_deref())
        .map(str::parse::<Mode>)
        .transpose()?
        .unwrap_or_default();

    Ok(InstallOptions {
        force: opts.force_reinstall || settings.force_reinstall,
        dry_run: opts.dry_run,
        mode,
        manager: ManagerOptions {
            custom_bin_path: opts
                .custom_bin_path
                .clone()
                .or_else(|| settings.miniforge.bin_path.clone()),
            env_name: settings.miniforge.env_name().to_string(),
        },
    })
}
