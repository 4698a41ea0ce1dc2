//! Host detection: operating system, CPU architecture and Linux distribution
//! family (used to bootstrap git).
use std::fmt;

use crate::exec::Executor;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

impl Os {
    /// Detect the current operating system.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            // Default to Linux for other Unix-like systems
            Self::Linux
        }
    }

    /// Name used in Miniforge installer asset names (`Linux`, `MacOSX`).
    #[must_use]
    pub const fn miniforge_name(self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::MacOs => "MacOSX",
        }
    }
}

/// Detected CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Aarch64,
}

impl Arch {
    /// Detect the current CPU architecture.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_arch = "aarch64") {
            Self::Aarch64
        } else {
            Self::X86_64
        }
    }

    /// Name used in Miniforge installer asset names.
    ///
    /// Miniforge publishes `aarch64` for Linux but `arm64` for macOS.
    #[must_use]
    pub const fn miniforge_name(self, os: Os) -> &'static str {
        match (self, os) {
            (Self::X86_64, _) => "x86_64",
            (Self::Aarch64, Os::Linux) => "aarch64",
            (Self::Aarch64, Os::MacOs) => "arm64",
        }
    }

    /// Name used in Neovim `AppImage` asset names.
    #[must_use]
    pub const fn appimage_name(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "arm64",
        }
    }
}

/// Linux distribution family, as far as package installation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    /// Debian, Ubuntu, Mint (`apt-get`).
    Debian,
    /// Fedora, RHEL, CentOS, Rocky, Alma (`dnf`/`yum`).
    Fedora,
    /// Arch, Manjaro (`pacman`).
    Arch,
    /// Alpine (`apk`).
    Alpine,
    /// openSUSE, SLES (`zypper`).
    Suse,
    /// Anything else.
    Unknown,
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::Arch => "arch",
            Self::Alpine => "alpine",
            Self::Suse => "suse",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Files read to identify the distribution, in order.
const OS_RELEASE_FILES: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

impl Distro {
    /// Map an os-release identifier (`ID` or one word of `ID_LIKE`).
    fn from_id(id: &str) -> Self {
        match id {
            "debian" | "ubuntu" | "linuxmint" | "mint" | "pop" | "raspbian" => Self::Debian,
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" | "alma" => Self::Fedora,
            "arch" | "manjaro" | "endeavouros" => Self::Arch,
            "alpine" => Self::Alpine,
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "suse" | "sles" => Self::Suse,
            _ => Self::Unknown,
        }
    }

    /// Identify the distribution from the contents of an os-release file.
    ///
    /// `ID` is tried first, then each word of `ID_LIKE`.
    #[must_use]
    pub fn from_os_release(content: &str) -> Self {
        let field = |key: &str| {
            content.lines().find_map(|line| {
                let (k, v) = line.split_once('=')?;
                (k.trim() == key).then(|| v.trim().trim_matches(['"', '\'']).to_ascii_lowercase())
            })
        };

        let mut ids: Vec<String> = field("ID").into_iter().collect();
        if let Some(like) = field("ID_LIKE") {
            ids.extend(like.split_whitespace().map(String::from));
        }
        ids.iter()
            .map(|id| Self::from_id(id))
            .find(|d| *d != Self::Unknown)
            .unwrap_or(Self::Unknown)
    }

    /// Identify the distribution from installed package tools.
    #[must_use]
    pub fn from_available_tools(executor: &dyn Executor) -> Self {
        const PROBES: &[(&str, Distro)] = &[
            ("apt-get", Distro::Debian),
            ("dnf", Distro::Fedora),
            ("yum", Distro::Fedora),
            ("pacman", Distro::Arch),
            ("apk", Distro::Alpine),
            ("zypper", Distro::Suse),
        ];
        PROBES
            .iter()
            .find(|(tool, _)| executor.which(tool))
            .map_or(Self::Unknown, |(_, distro)| *distro)
    }

    /// Detect the distribution: os-release first, then tool probing.
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Self {
        let from_file = OS_RELEASE_FILES
            .iter()
            .find_map(|path| std::fs::read_to_string(path).ok())
            .map_or(Self::Unknown, |content| Self::from_os_release(&content));
        if from_file == Self::Unknown {
            Self::from_available_tools(executor)
        } else {
            from_file
        }
    }

    /// Commands (run through `sudo`) that install git on this distribution.
    ///
    /// On Fedora-family hosts `yum` is used when `dnf` is absent.
    #[must_use]
    pub fn git_install_commands(self, executor: &dyn Executor) -> Vec<Vec<&'static str>> {
        match self {
            Self::Debian => vec![
                vec!["apt-get", "update", "-y"],
                vec!["apt-get", "install", "-y", "git"],
            ],
            Self::Fedora if !executor.which("dnf") && executor.which("yum") => {
                vec![vec!["yum", "install", "-y", "git"]]
            }
            Self::Fedora => vec![vec!["dnf", "install", "-y", "git"]],
            Self::Arch => vec![vec!["pacman", "-Sy", "--noconfirm", "git"]],
            Self::Alpine => vec![vec!["apk", "add", "git"]],
            Self::Suse => vec![vec!["zypper", "install", "-y", "git"]],
            Self::Unknown => vec![],
        }
    }
}
