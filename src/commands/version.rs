//! Command: print version information.

/// Version string: `APPSTRAP_VERSION` at build time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("APPSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the appstrap version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("appstrap {}", version());
}
