//! Application catalog: maps app names to executable commands and optional
//! custom install procedures.
//!
//! Lookups are case-insensitive. Names missing from the catalog resolve to a
//! generic [`App`] whose only command is the lowercased, hyphenated name.
mod builtin;
mod neovim;

use anyhow::Result;
use std::collections::BTreeMap;

use crate::environment::EnvironmentContext;
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Log;

/// Everything a custom installer may touch.
#[derive(Debug, Clone, Copy)]
pub struct InstallContext<'a> {
    /// Probed environment for this run.
    pub env: &'a EnvironmentContext,
    /// Process executor.
    pub executor: &'a dyn Executor,
    /// Logger.
    pub log: &'a dyn Log,
}

/// A custom installation procedure, preferred over the package manager.
///
/// Receives the force-reinstall flag. An error means the app falls back to
/// the package manager.
pub type CustomInstall = fn(&InstallContext<'_>, bool) -> Result<()>;

/// Normalise an app name to its key: lowercase, spaces replaced by hyphens.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// One installable application.
///
/// Immutable; installed state is derived on demand by [`App::is_installed`].
#[derive(Debug, Clone)]
pub struct App {
    name: String,
    commands: Vec<String>,
    custom_install: Option<CustomInstall>,
}

impl App {
    /// Create an app with explicit commands.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCommands`] if `commands` is empty or
    /// contains only blank entries.
    pub fn new(name: &str, commands: Vec<String>) -> Result<Self, ConfigError> {
        let commands: Vec<String> = commands
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if commands.is_empty() {
            return Err(ConfigError::EmptyCommands(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            commands,
            custom_install: None,
        })
    }

    /// Create the generic app for a name missing from the catalog.
    ///
    /// ```
    /// use appstrap::catalog::App;
    ///
    /// let app = App::generic("Unknown Tool");
    /// assert_eq!(app.commands(), ["unknown-tool"]);
    /// assert!(!app.has_custom_install());
    /// ```
    #[must_use]
    pub fn generic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: vec![normalize_name(name)],
            custom_install: None,
        }
    }

    /// Attach a custom installer.
    #[must_use]
    pub fn with_custom_install(mut self, install: CustomInstall) -> Self {
        self.custom_install = Some(install);
        self
    }

    /// Name as requested.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executable commands; the first is the canonical one.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// The canonical executable used for the installed check.
    #[must_use]
    pub fn primary_command(&self) -> &str {
        self.commands.first().map_or("", String::as_str)
    }

    /// Name handed to the package manager.
    #[must_use]
    pub fn package_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// The custom installer, if any.
    #[must_use]
    pub const fn custom_install(&self) -> Option<CustomInstall> {
        self.custom_install
    }

    /// Whether a custom installer is registered.
    #[must_use]
    pub const fn has_custom_install(&self) -> bool {
        self.custom_install.is_some()
    }

    /// True iff the canonical command resolves on the search path.
    #[must_use]
    pub fn is_installed(&self, executor: &dyn Executor) -> bool {
        executor.which(self.primary_command())
    }

    fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }
}

/// Case-insensitive table of known applications.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    entries: BTreeMap<String, App>,
}

impl AppCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for app in builtin::apps() {
            catalog.register(app);
        }
        catalog
    }

    /// Register (or replace) an entry, keyed by its normalised name.
    pub fn register(&mut self, app: App) {
        self.entries.insert(normalize_name(app.name()), app);
    }

    /// Replace the commands of `name`, keeping any custom installer.
    ///
    /// An unknown name registers a new entry without installer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCommands`] if `commands` is empty.
    pub fn override_commands(&mut self, name: &str, commands: Vec<String>) -> Result<(), ConfigError> {
        let key = normalize_name(name);
        let mut app = App::new(&key, commands)?;
        if let Some(existing) = self.entries.get(&key) {
            app.custom_install = existing.custom_install;
        }
        self.entries.insert(key, app);
        Ok(())
    }

    /// Merge a command table (name to commands) over this catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCommands`] for the first empty entry.
    pub fn merge_commands<I>(&mut self, table: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        for (name, commands) in table {
            self.override_commands(&name, commands)?;
        }
        Ok(())
    }

    /// Look `name` up, ignoring case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<App> {
        self.entries
            .get(&normalize_name(name))
            .map(|app| app.renamed(name.trim()))
    }

    /// Look `name` up, falling back to [`App::generic`].
    #[must_use]
    pub fn resolve(&self, name: &str) -> App {
        self.lookup(name)
            .unwrap_or_else(|| App::generic(name.trim()))
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = &App> {
        self.entries.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
