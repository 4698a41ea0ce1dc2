//! App list files: `<lists_dir>/<name>.txt`, one app name per line.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Special list name selecting every list in the directory.
pub const FULL_LIST: &str = "full";

/// Parse the contents of a list file.
///
/// Blank lines and `#` comments are skipped; surrounding whitespace is
/// trimmed. Order is preserved and duplicates are kept.
///
/// # Examples
///
/// ```
/// use appstrap::config::app_list::parse_list;
///
/// let names = parse_list("# editors\nneovim\n\n  helix  \n");
/// assert_eq!(names, ["neovim", "helix"]);
/// ```
#[must_use]
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Names of the lists (`*.txt` stems) in `dir`, sorted.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the directory cannot be read.
pub fn available_lists(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

fn list_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

/// Read one list by name.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownList`] if no such list exists, or
/// [`ConfigError::Io`] if it cannot be read.
pub fn load_list(dir: &Path, name: &str) -> Result<Vec<String>, ConfigError> {
    let available = available_lists(dir)?;
    if !available.iter().any(|n| n == name) {
        return Err(ConfigError::UnknownList {
            name: name.to_string(),
            available: available.join(", "),
        });
    }
    let path = list_path(dir, name);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(parse_list(&content))
}

/// Read the requested lists, in order, concatenating their names.
///
/// [`FULL_LIST`] expands to every available list in sorted order.
///
/// # Errors
///
/// Returns the first error from [`load_list`].
pub fn load_lists(dir: &Path, names: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut apps = Vec::new();
    for name in names {
        if name == FULL_LIST {
            for list in available_lists(dir)? {
                apps.extend(load_list(dir, &list)?);
            }
        } else {
            apps.extend(load_list(dir, name)?);
        }
    }
    Ok(apps)
}
