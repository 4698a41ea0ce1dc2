//! User settings file (`config.toml`).
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::toml_loader::load_config;
use crate::error::ConfigError;

/// Default name of the user-space environment.
pub const DEFAULT_ENV_NAME: &str = "apps";

/// Settings read from `config.toml`. Every key is optional.
///
/// ```toml
/// mode = "miniforge"
/// lists_dir = "/srv/app_lists"
/// force_reinstall = false
///
/// [miniforge]
/// bin_path = "/opt/conda/bin/mamba"
/// env_name = "tools"
///
/// [commands]
/// ripgrep = ["rg"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manager selection: `auto`, `brew` or `miniforge`.
    pub mode: Option<String>,
    /// Directory holding the app list files.
    pub lists_dir: Option<PathBuf>,
    /// Reinstall apps that are already present.
    pub force_reinstall: bool,
    /// User-space manager settings.
    pub miniforge: MiniforgeSettings,
    /// Command overrides, merged over the built-in catalog.
    pub commands: BTreeMap<String, Vec<String>>,
}

/// `[miniforge]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiniforgeSettings {
    /// Explicit path to the `mamba` binary.
    pub bin_path: Option<PathBuf>,
    /// Name of the isolated environment.
    pub env_name: Option<String>,
}

impl MiniforgeSettings {
    /// Environment name, defaulting to [`DEFAULT_ENV_NAME`].
    #[must_use]
    pub fn env_name(&self) -> &str {
        self.env_name.as_deref().unwrap_or(DEFAULT_ENV_NAME)
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Default settings location: `$XDG_CONFIG_HOME/appstrap/config.toml`,
    /// else `~/.config/appstrap/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME")
                    .filter(|v| !v.is_empty())
                    .map(|h| PathBuf::from(h).join(".config"))
            })?;
        Some(base.join("appstrap").join("config.toml"))
    }
}
