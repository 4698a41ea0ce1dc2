//! Binary link resource: exposes an executable from an isolated environment
//! in the user-local bin directory.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// A symlink `target -> source` for one executable.
///
/// Any entry already present at `target` (file, directory, or link, broken or
/// not) counts as satisfied: existing user binaries are never replaced.
#[derive(Debug, Clone)]
pub struct BinaryLink {
    /// The executable inside the environment (what the link points to).
    pub source: PathBuf,
    /// The link path inside the user-local bin directory.
    pub target: PathBuf,
}

impl BinaryLink {
    /// Create a new binary link resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Link `command` from `source_dir` into `bin_dir`.
    #[must_use]
    pub fn for_command(source_dir: &Path, bin_dir: &Path, command: &str) -> Self {
        Self::new(source_dir.join(command), bin_dir.join(command))
    }
}

impl Applicable for BinaryLink {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => return Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        super::helpers::fs::ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target).map_err(|e| ResourceError::Link {
            target: self.target.clone(),
            source_path: self.source.clone(),
            reason: format!("{e:#}"),
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for BinaryLink {
    fn current_state(&self) -> Result<ResourceState> {
        if self.target.symlink_metadata().is_ok() {
            return Ok(ResourceState::Correct);
        }
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        Ok(ResourceState::Missing)
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(not(unix))]
    {
        std::fs::copy(target, link).with_context(|| {
            format!("copying {} to {}", target.display(), link.display())
        })?;
    }

    Ok(())
}
