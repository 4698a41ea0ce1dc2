//! Top-level subcommands and the configuration sequence they share.
pub mod catalog;
pub mod git;
pub mod install;
pub mod managers;
pub mod version;

use anyhow::Result;
use std::path::PathBuf;

use crate::catalog::AppCatalog;
use crate::cli::SourceOpts;
use crate::config::{self, ListsDirSources, Settings};
use crate::logging::Log;

/// Shared state produced by the common configuration sequence.
///
/// Loads the settings file, locates the lists directory and builds the
/// effective catalog so each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Settings file contents, or defaults.
    pub settings: Settings,
    /// First existing lists directory, if any.
    pub lists_dir: Option<PathBuf>,
    /// Built-in catalog with every command override applied.
    pub catalog: AppCatalog,
}

impl CommandSetup {
    /// Load the settings, resolve the lists directory and build the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file, `commands.json` or a command
    /// override is invalid.
    pub fn init(sources: &SourceOpts, log: &dyn Log) -> Result<Self> {
        log.stage("Loading configuration");

        let settings = match sources.config.clone().or_else(Settings::default_path) {
            Some(path) => {
                if sources.config.is_some() && !path.exists() {
                    log.warn(&format!(
                        "settings file {} does not exist; using defaults",
                        path.display()
                    ));
                } else {
                    log.debug(&format!("settings: {}", path.display()));
                }
                Settings::load(&path)?
            }
            None => Settings::default(),
        };

        let dir_sources = ListsDirSources::from_process(sources.lists_dir.clone(), &settings);
        for (origin, path) in dir_sources.missing_explicit() {
            log.warn(&format!(
                "lists directory {} (from {origin}) does not exist; searching other locations",
                path.display()
            ));
        }
        let lists_dir = dir_sources.resolve();
        match &lists_dir {
            Some(dir) => log.info(&format!("app lists: {}", dir.display())),
            None => log.debug("no app lists directory found"),
        }

        let catalog = config::load_catalog(lists_dir.as_deref(), &settings)?;
        log.debug(&format!("{} catalog entries", catalog.len()));

        Ok(Self {
            settings,
            lists_dir,
            catalog,
        })
    }
}
