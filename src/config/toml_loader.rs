//! TOML configuration file loading.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes from an empty document, so every field falls
/// back to its `#[serde(default)]`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if an existing file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    toml::from_str(&content).map_err(|e| ConfigError::InvalidSyntax {
        format: "TOML",
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}
