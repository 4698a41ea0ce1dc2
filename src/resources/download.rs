//! Downloads through `curl`/`wget`, SHA-256 verification, and the downloaded
//! executable resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;
use crate::exec::Executor;
use crate::logging::Log;

/// Number of download attempts.
const RETRY_COUNT: u32 = 3;

/// Seconds to wait between download retries.
const RETRY_DELAY: u64 = 2;

/// TCP connect timeout in seconds.
const CONNECT_TIMEOUT: u64 = 10;

/// Total transfer timeout in seconds.
const TRANSFER_TIMEOUT: u64 = 300;

/// Download `url` to `dest`, retrying up to three times.
///
/// Uses `curl` when available and falls back to `wget`. A partial file is
/// removed when every attempt fails.
///
/// # Errors
///
/// Returns [`ResourceError::NoDownloader`] when neither tool is installed and
/// [`ResourceError::Download`] when every attempt fails.
pub fn download(executor: &dyn Executor, log: &dyn Log, url: &str, dest: &Path) -> Result<()> {
    let connect_timeout = CONNECT_TIMEOUT.to_string();
    let transfer_timeout = TRANSFER_TIMEOUT.to_string();
    let dest_str = dest.to_str().context("download path is not valid UTF-8")?;
    super::helpers::fs::ensure_parent_dir(dest)?;

    log.debug(&format!("downloading {url} to {dest_str}"));
    for attempt in 1..=RETRY_COUNT {
        if attempt > 1 {
            log.warn(&format!(
                "retry {attempt}/{RETRY_COUNT} for {url} after {RETRY_DELAY}s"
            ));
            #[cfg(not(test))]
            std::thread::sleep(std::time::Duration::from_secs(RETRY_DELAY));
        }

        let result = if executor.which("curl") {
            executor.run_unchecked(
                "curl",
                &[
                    "-fsSL",
                    "--connect-timeout",
                    &connect_timeout,
                    "--max-time",
                    &transfer_timeout,
                    "-o",
                    dest_str,
                    url,
                ],
            )
        } else if executor.which("wget") {
            executor.run_unchecked(
                "wget",
                &[
                    "-qO",
                    dest_str,
                    &format!("--connect-timeout={connect_timeout}"),
                    &format!("--timeout={transfer_timeout}"),
                    url,
                ],
            )
        } else {
            return Err(ResourceError::NoDownloader(url.to_string()).into());
        };

        if result.map(|r| r.success).unwrap_or(false) {
            return Ok(());
        }
    }

    let _ = std::fs::remove_file(dest);
    Err(ResourceError::Download {
        url: url.to_string(),
        attempts: RETRY_COUNT,
    }
    .into())
}

/// Fetch `url` and return its body, or `None` if it cannot be fetched.
#[must_use]
pub fn fetch_text(executor: &dyn Executor, url: &str) -> Option<String> {
    let connect_timeout = CONNECT_TIMEOUT.to_string();
    let transfer_timeout = CONNECT_TIMEOUT.saturating_mul(3).to_string();

    let output = if executor.which("curl") {
        executor
            .run_unchecked(
                "curl",
                &[
                    "-fsSL",
                    "--connect-timeout",
                    &connect_timeout,
                    "--max-time",
                    &transfer_timeout,
                    url,
                ],
            )
            .ok()
    } else if executor.which("wget") {
        executor
            .run_unchecked(
                "wget",
                &[
                    "-qO-",
                    &format!("--connect-timeout={connect_timeout}"),
                    &format!("--timeout={transfer_timeout}"),
                    url,
                ],
            )
            .ok()
    } else {
        None
    };
    output.filter(|r| r.success).map(|r| r.stdout)
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {} for checksum verification", path.display()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Extract the digest from a published checksum file for `asset`.
///
/// Accepts both a bare digest and `sha256sum` style `<digest>  <file>`
/// lines; when several lines are present the one naming `asset` wins.
#[must_use]
pub fn parse_published_digest(checksums: &str, asset: &str) -> Option<String> {
    let mut lines = checksums.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = if checksums.lines().filter(|l| !l.trim().is_empty()).count() > 1 {
        lines.find(|l| l.contains(asset))?
    } else {
        lines.next()?
    };
    line.split_whitespace()
        .next()
        .filter(|d| d.len() == 64 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_ascii_lowercase)
}

/// Verify `path` against the checksum published at `checksum_url`.
///
/// Skips verification with a warning when the checksum file is unavailable
/// or carries no entry for `asset`. A mismatching file is deleted.
///
/// # Errors
///
/// Returns [`ResourceError::ChecksumMismatch`] when the digests differ, or an
/// error if the file cannot be read.
pub fn verify_checksum(
    executor: &dyn Executor,
    log: &dyn Log,
    checksum_url: &str,
    asset: &str,
    path: &Path,
) -> Result<()> {
    let Some(expected) =
        fetch_text(executor, checksum_url).and_then(|text| parse_published_digest(&text, asset))
    else {
        log.warn(&format!(
            "no published checksum for {asset}; skipping verification"
        ));
        return Ok(());
    };

    let actual = compute_sha256(path)?;
    if expected != actual {
        let _ = std::fs::remove_file(path);
        return Err(ResourceError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        }
        .into());
    }
    log.debug(&format!("checksum verified for {asset}"));
    Ok(())
}

/// An executable file fetched from a URL (e.g. an `AppImage`).
#[derive(Debug)]
pub struct DownloadedExecutable<'a> {
    /// Source URL.
    pub url: String,
    /// Destination path.
    pub target: PathBuf,
    /// Replace an existing file.
    pub force: bool,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> DownloadedExecutable<'a> {
    /// Create a new downloaded executable resource.
    #[must_use]
    pub const fn new(
        url: String,
        target: PathBuf,
        force: bool,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            url,
            target,
            force,
            executor,
            log,
        }
    }
}

impl Applicable for DownloadedExecutable<'_> {
    fn description(&self) -> String {
        format!("{} <- {}", self.target.display(), self.url)
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Incorrect { .. } if !self.force => {
                super::helpers::fs::make_executable(&self.target)?;
                return Ok(ResourceChange::Applied);
            }
            _ => {}
        }

        let mut tmp = self.target.clone().into_os_string();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);
        download(self.executor, self.log, &self.url, &tmp)?;
        std::fs::rename(&tmp, &self.target).with_context(|| {
            format!("moving {} to {}", tmp.display(), self.target.display())
        })?;
        super::helpers::fs::make_executable(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DownloadedExecutable<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.target.exists() {
            return Ok(ResourceState::Missing);
        }
        if self.force {
            return Ok(ResourceState::Incorrect {
                current: "reinstall requested".to_string(),
            });
        }
        if super::helpers::fs::is_executable(&self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "not executable".to_string(),
            })
        }
    }
}
