//! Domain-specific error types for appstrap.
//!
//! Internal modules return typed errors (e.g. [`ManagerError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.  Callers that need to
//! branch on a specific failure use `anyhow::Error::downcast_ref`.
//!
//! # Error hierarchy
//!
//! ```text
//! AppstrapError
//! ├── Config(ConfigError)     : app lists, command tables, settings
//! ├── Manager(ManagerError)   : availability, environments, batch installs
//! ├── Resource(ResourceError) : links and downloaded executables
//! └── Platform(PlatformError) : distro detection for the git bootstrap
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for appstrap.
#[derive(Error, Debug)]
pub enum AppstrapError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Package manager error.
    #[error("Package manager error: {0}")]
    Manager(#[from] ManagerError),

    /// Resource operation error.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Platform-specific operation error.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Errors that arise from loading app lists, command tables and settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither app names nor an app list were requested.
    #[error("no apps requested: pass app names or --app-list")]
    NothingRequested,

    /// The requested app list does not exist in the lists directory.
    #[error("unknown app list '{name}' (available: {available})")]
    UnknownList {
        /// Requested list name.
        name: String,
        /// Comma-separated list of the lists that do exist.
        available: String,
    },

    /// An app list was requested but no lists directory could be found.
    #[error("cannot find app lists directory: use --lists-dir or set APPSTRAP_LISTS_DIR")]
    ListsDirNotFound,

    /// A command table entry maps an app to no commands.
    #[error("app '{0}' has an empty command list")]
    EmptyCommands(String),

    /// A config file could not be parsed.
    #[error("invalid {format} in {path}: {message}")]
    InvalidSyntax {
        /// File format (`TOML` or `JSON`).
        format: &'static str,
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from package manager operations.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// An operation requiring a ready manager was invoked before
    /// `ensure_available` succeeded.
    #[error("{manager} is not available: call ensure_available() first")]
    NotReady {
        /// Manager name.
        manager: String,
    },

    /// The manager could not be found or bootstrapped.
    #[error("{manager} is unavailable: {reason}")]
    Unavailable {
        /// Manager name.
        manager: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The isolated environment could not be created.
    #[error("failed to create environment '{env}' with {manager}")]
    EnvironmentCreate {
        /// Manager name.
        manager: String,
        /// Environment name.
        env: String,
        /// Underlying error.
        source: anyhow::Error,
    },

    /// The single batch install command failed.
    #[error("{manager} failed to install {}", .packages.join(", "))]
    BatchInstall {
        /// Manager name.
        manager: String,
        /// Package names in the failed batch.
        packages: Vec<String>,
        /// Underlying error.
        source: anyhow::Error,
    },

    /// The requested manager name is not registered.
    #[error("unknown package manager '{0}' (expected brew or miniforge)")]
    Unknown(String),
}

/// Errors that arise from resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A symlink could not be created.
    #[error("cannot link {target} -> {source_path}: {reason}")]
    Link {
        /// Link path.
        target: PathBuf,
        /// Path the link points to.
        source_path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A download failed after all retries.
    #[error("download of {url} failed after {attempts} attempts")]
    Download {
        /// Requested URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Neither curl nor wget is available.
    #[error("curl or wget is required to download {0}")]
    NoDownloader(String),

    /// A downloaded file did not match its published checksum.
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Path to the downloaded file.
        path: PathBuf,
        /// Published digest.
        expected: String,
        /// Computed digest.
        actual: String,
    },
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The operation is not supported on the detected platform.
    #[error("{operation} is not supported on {platform}")]
    Unsupported {
        /// What was attempted.
        operation: String,
        /// Detected platform or distribution.
        platform: String,
    },

    /// A tool is still missing after its installation was attempted.
    #[error("{0} is still not available after installation")]
    StillMissing(String),
}
