//! Command: list the registered package managers.
use crate::environment::probe_elevated_access;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::managers::ManagerKind;

/// Run the managers command.
#[allow(clippy::print_stdout)]
pub fn run(log: &Logger) {
    let executor = SystemExecutor;
    let elevated = probe_elevated_access(&executor);
    log.debug(&format!("elevated access: {elevated}"));
    println!("{}", render(elevated, &executor));
}

/// The registry, marking the manager auto mode would pick.
#[must_use]
pub fn render(elevated: bool, executor: &dyn Executor) -> String {
    let auto = ManagerKind::for_access(elevated);
    let mut lines: Vec<String> = ManagerKind::ALL
        .into_iter()
        .map(|kind| {
            let marker = if kind == auto { "*" } else { " " };
            let found = match kind {
                ManagerKind::Homebrew if executor.which("brew") => "  [on PATH]",
                ManagerKind::Miniforge if executor.which("mamba") => "  [on PATH]",
                _ => "",
            };
            format!("{marker} {:<10} {}{found}", kind.name(), kind.description())
        })
        .collect();
    lines.push(format!(
        "auto mode: {auto} (elevated access: {})",
        if elevated { "yes" } else { "no" }
    ));
    lines.join("\n")
}
