//! Configuration: settings file, app lists, command tables and the lists
//! directory lookup.
pub mod app_list;
pub mod commands;
pub mod settings;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use crate::catalog::AppCatalog;
use crate::error::ConfigError;

pub use settings::Settings;

/// Environment variable naming the lists directory.
pub const LISTS_DIR_ENV: &str = "APPSTRAP_LISTS_DIR";

/// Directory name searched for next to the executable and in the working
/// directory.
const LISTS_DIR_NAME: &str = "app_lists";

/// Candidate lists directories, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ListsDirSources {
    /// `--lists-dir`.
    pub cli: Option<PathBuf>,
    /// `APPSTRAP_LISTS_DIR`.
    pub env: Option<PathBuf>,
    /// `lists_dir` from the settings file.
    pub settings: Option<PathBuf>,
    /// Path of the running executable.
    pub exe: Option<PathBuf>,
    /// Current working directory.
    pub cwd: Option<PathBuf>,
}

impl ListsDirSources {
    /// Gather the sources from the process environment.
    #[must_use]
    pub fn from_process(cli: Option<PathBuf>, settings: &Settings) -> Self {
        Self {
            cli,
            env: std::env::var_os(LISTS_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            settings: settings.lists_dir.clone(),
            exe: std::env::current_exe().ok(),
            cwd: std::env::current_dir().ok(),
        }
    }

    /// Ordered candidates: explicit sources first, then `app_lists` one and
    /// two levels above the executable's directory, then `./app_lists`.
    fn candidates(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = [&self.cli, &self.env, &self.settings]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if let Some(exe_dir) = self.exe.as_deref().and_then(Path::parent) {
            out.extend(
                exe_dir
                    .ancestors()
                    .skip(1)
                    .take(2)
                    .map(|dir| dir.join(LISTS_DIR_NAME)),
            );
        }
        if let Some(cwd) = &self.cwd {
            out.push(cwd.join(LISTS_DIR_NAME));
        }
        out
    }

    /// The first candidate that is an existing directory.
    ///
    /// Explicit sources that do not exist are skipped; report them with
    /// [`ListsDirSources::missing_explicit`].
    #[must_use]
    pub fn resolve(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|p| p.is_dir())
    }

    /// Explicitly configured directories that do not exist, labelled with
    /// where they came from.
    #[must_use]
    pub fn missing_explicit(&self) -> Vec<(&'static str, &Path)> {
        [
            ("--lists-dir", &self.cli),
            (LISTS_DIR_ENV, &self.env),
            ("settings lists_dir", &self.settings),
        ]
        .into_iter()
        .filter_map(|(label, path)| path.as_deref().map(|p| (label, p)))
        .filter(|(_, p)| !p.is_dir())
        .collect()
    }
}

/// Build the effective catalog: built-in entries, then `commands.json` from
/// the lists directory, then the settings `[commands]` table.
///
/// # Errors
///
/// Returns an error if `commands.json` cannot be parsed or any override
/// has an empty command list.
pub fn load_catalog(lists_dir: Option<&Path>, settings: &Settings) -> Result<AppCatalog, ConfigError> {
    let mut catalog = AppCatalog::builtin();
    if let Some(dir) = lists_dir {
        catalog.merge_commands(commands::load_commands(&dir.join(commands::COMMANDS_FILE))?)?;
    }
    catalog.merge_commands(settings.commands.clone())?;
    Ok(catalog)
}
