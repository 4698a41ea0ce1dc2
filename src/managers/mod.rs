//! Package manager abstraction and its two variants.
//!
//! [`Homebrew`](homebrew::Homebrew) installs system-wide and needs elevated
//! access to bootstrap; [`Miniforge`](miniforge::Miniforge) installs into an
//! isolated environment under the user's home and links the resulting
//! executables into `~/.local/bin`.
pub mod homebrew;
pub mod miniforge;

use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::{App, InstallContext};
use crate::config::settings::DEFAULT_ENV_NAME;
use crate::environment::EnvironmentContext;
use crate::error::ManagerError;

/// Registered package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    /// Homebrew (`brew`), the privileged system manager.
    Homebrew,
    /// Miniforge (`mamba`), the user-space environment manager.
    Miniforge,
}

impl ManagerKind {
    /// Every registered manager, in display order.
    pub const ALL: [Self; 2] = [Self::Homebrew, Self::Miniforge];

    /// Registry key, as accepted by `--mode`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Homebrew => "brew",
            Self::Miniforge => "miniforge",
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Homebrew => "Homebrew, system-wide (needs elevated access to bootstrap)",
            Self::Miniforge => "Miniforge/mamba, isolated environment linked into ~/.local/bin",
        }
    }

    /// Whether the manager needs elevated access.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Homebrew)
    }

    /// Manager picked by auto mode: Homebrew with elevated access, else
    /// Miniforge.
    #[must_use]
    pub const fn for_access(elevated: bool) -> Self {
        if elevated {
            Self::Homebrew
        } else {
            Self::Miniforge
        }
    }

    /// [`ManagerKind::for_access`] for the probed environment.
    #[must_use]
    pub const fn auto_select(env: &EnvironmentContext) -> Self {
        Self::for_access(env.has_elevated_access)
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ManagerKind {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or(ManagerError::Unknown(key))
    }
}

/// Manager selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pick by probing for elevated access.
    #[default]
    Auto,
    /// Always use this manager.
    Explicit(ManagerKind),
}

impl Mode {
    /// Resolve the mode to a manager; an explicit mode always wins.
    #[must_use]
    pub const fn select(self, env: &EnvironmentContext) -> ManagerKind {
        match self {
            Self::Auto => ManagerKind::auto_select(env),
            Self::Explicit(kind) => kind,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for Mode {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Explicit)
        }
    }
}

/// Availability of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Not yet located or bootstrapped.
    NotReady,
    /// Located and usable. Terminal.
    Ready,
}

/// Fail with [`ManagerError::NotReady`] unless `state` is ready.
///
/// # Errors
///
/// Returns [`ManagerError::NotReady`] naming `manager`.
pub fn require_ready(manager: &str, state: ManagerState) -> Result<(), ManagerError> {
    match state {
        ManagerState::Ready => Ok(()),
        ManagerState::NotReady => Err(ManagerError::NotReady {
            manager: manager.to_string(),
        }),
    }
}

/// Outcome of linking binaries, by command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Links created.
    pub linked: Vec<String>,
    /// Targets that already existed and were left alone.
    pub present: Vec<String>,
    /// Binaries skipped because the environment does not provide them.
    pub skipped: Vec<String>,
    /// Binaries whose link could not be created.
    pub failed: Vec<String>,
}

impl LinkReport {
    /// Append another report.
    pub fn merge(&mut self, other: Self) {
        self.linked.extend(other.linked);
        self.present.extend(other.present);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// Total number of binaries considered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.linked.len() + self.present.len() + self.skipped.len() + self.failed.len()
    }
}

/// Operations every package manager supports.
///
/// `install_packages` and `link_binary` fail with
/// [`ManagerError::NotReady`] until `ensure_available` has succeeded.
pub trait PackageManager: fmt::Debug {
    /// Which manager this is.
    fn kind(&self) -> ManagerKind;

    /// Current availability.
    fn state(&self) -> ManagerState;

    /// Locate the manager, bootstrapping it if absent.
    ///
    /// The only `NotReady -> Ready` transition; a no-op once ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager cannot be found or installed.
    fn ensure_available(&mut self) -> Result<()>;

    /// Install `apps` in one batch, then link their binaries where the
    /// manager does not put them on the path itself.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotReady`] before `ensure_available`, and
    /// [`ManagerError::BatchInstall`] if the batch command fails.
    fn install_packages(&self, apps: &[App], force: bool) -> Result<LinkReport>;

    /// Expose `app`'s executables on the user's path.
    ///
    /// Per-binary problems are logged and reported, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotReady`] before `ensure_available`.
    fn link_binary(&self, app: &App) -> Result<LinkReport>;

    /// Registry key of this manager.
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Construction options for managers.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Explicit `mamba` binary (user-space manager only).
    pub custom_bin_path: Option<PathBuf>,
    /// Isolated environment name (user-space manager only).
    pub env_name: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            custom_bin_path: None,
            env_name: DEFAULT_ENV_NAME.to_string(),
        }
    }
}

/// Instantiate the manager for `kind`.
#[must_use]
pub fn create<'a>(
    kind: ManagerKind,
    ctx: InstallContext<'a>,
    options: &ManagerOptions,
) -> Box<dyn PackageManager + 'a> {
    match kind {
        ManagerKind::Homebrew => Box::new(homebrew::Homebrew::new(ctx)),
        ManagerKind::Miniforge => Box::new(miniforge::Miniforge::new(
            ctx,
            options.custom_bin_path.clone(),
            &options.env_name,
        )),
    }
}
