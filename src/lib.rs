//! Application bootstrapper.
//!
//! Installs developer applications by name through one of two package
//! managers: Homebrew when the user has elevated access, otherwise a
//! Miniforge environment in the user's home whose executables are linked
//! into `~/.local/bin`.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: settings file, app lists and command tables
//! - **[`catalog`]**: app name to executable commands, plus custom installers
//! - **[`resources`]**: idempotent `check + apply` primitives (links, downloads)
//! - **[`managers`]**: the package manager trait and its two variants
//! - **[`orchestrator`]**: resolution of requested apps and the batch install
//! - **[`commands`]**: top-level subcommands (`install`, `managers`, `catalog`, ...)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod logging;
pub mod managers;
pub mod orchestrator;
pub mod platform;
pub mod resources;
