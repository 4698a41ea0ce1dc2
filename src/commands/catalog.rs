//! Command: print the effective catalog.
use anyhow::Result;

use super::CommandSetup;
use crate::catalog::AppCatalog;
use crate::cli::CatalogOpts;
use crate::logging::Logger;

/// Run the catalog command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
#[allow(clippy::print_stdout)]
pub fn run(opts: &CatalogOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(&opts.sources, log)?;
    println!("{}", render(&setup.catalog));
    Ok(())
}

/// One line per entry: name, commands, and a marker for custom installers.
#[must_use]
pub fn render(catalog: &AppCatalog) -> String {
    let width = catalog.entries().map(|a| a.name().len()).max().unwrap_or(0);
    catalog
        .entries()
        .map(|app| {
            let marker = if app.has_custom_install() {
                "  (custom installer)"
            } else {
                ""
            };
            format!(
                "{:<width$}  {}{marker}",
                app.name(),
                app.commands().join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
