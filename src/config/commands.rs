//! `commands.json`: command overrides keyed by lowercase app name.
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// File name looked up inside the lists directory.
pub const COMMANDS_FILE: &str = "commands.json";

/// Load a command table. A missing file yields an empty table.
///
/// ```json
/// { "ripgrep": ["rg"], "nodejs": ["node", "npm"] }
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it is not a map of string lists.
pub fn load_commands(path: &Path) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::InvalidSyntax {
        format: "JSON",
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
