//! Built-in catalog entries: apps whose package name differs from the
//! executable they provide.
use super::{App, neovim};

/// `(name, commands)`; the first command is the canonical one.
const ENTRIES: &[(&str, &[&str])] = &[
    ("bottom", &["btm"]),
    ("fd-find", &["fd"]),
    ("git-delta", &["delta"]),
    ("go", &["go", "gofmt"]),
    ("helix", &["hx"]),
    ("neovim", &["nvim"]),
    ("nodejs", &["node", "npm", "npx"]),
    ("ripgrep", &["rg"]),
    ("tealdeer", &["tldr"]),
];

/// Build every built-in entry, attaching custom installers.
pub(super) fn apps() -> Vec<App> {
    ENTRIES
        .iter()
        .map(|(name, commands)| {
            let app = App {
                name: (*name).to_string(),
                commands: commands.iter().map(|c| (*c).to_string()).collect(),
                custom_install: None,
            };
            match *name {
                "neovim" => app.with_custom_install(neovim::install),
                _ => app,
            }
        })
        .collect()
}
