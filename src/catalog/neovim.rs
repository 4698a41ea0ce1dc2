//! Custom installer for Neovim: Homebrew when present, else the release
//! `AppImage` in the user-local bin directory.
use anyhow::{Result, bail};

use super::InstallContext;
use crate::platform::{Arch, Os};
use crate::resources::download::DownloadedExecutable;
use crate::resources::{Applicable as _, ResourceChange};

const RELEASE_URL: &str = "https://github.com/neovim/neovim/releases/latest/download";

/// Release asset URL for `arch`.
fn appimage_url(arch: Arch) -> String {
    format!("{RELEASE_URL}/nvim-linux-{}.appimage", arch.appimage_name())
}

/// Install Neovim.
///
/// # Errors
///
/// Returns an error if `brew install` fails, if the host is not Linux and
/// has no Homebrew, or if the `AppImage` cannot be downloaded.
pub(super) fn install(ctx: &InstallContext<'_>, force: bool) -> Result<()> {
    if ctx.executor.which("brew") {
        ctx.log.info("installing neovim with Homebrew");
        let mut args = vec!["install", "neovim"];
        if force {
            args.push("--force");
        }
        ctx.executor.run("brew", &args)?;
        return Ok(());
    }

    if Os::detect() != Os::Linux {
        bail!("neovim AppImage is only published for Linux");
    }
    install_appimage(ctx, Arch::detect(), force)
}

fn install_appimage(ctx: &InstallContext<'_>, arch: Arch, force: bool) -> Result<()> {
    let target = ctx.env.user_local_bin.join("nvim");
    let resource =
        DownloadedExecutable::new(appimage_url(arch), target, force, ctx.executor, ctx.log);
    match resource.apply()? {
        ResourceChange::AlreadyCorrect => {
            ctx.log
                .info(&format!("neovim already present at {}", resource.target.display()));
        }
        ResourceChange::Applied => {
            ctx.log
                .info(&format!("neovim installed at {}", resource.target.display()));
        }
        ResourceChange::Skipped { reason } => bail!("neovim not installed: {reason}"),
    }
    Ok(())
}
