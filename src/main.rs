//! `appstrap` command-line entry point.
use anyhow::Result;
use clap::Parser;

use appstrap::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());
    let log = logging::Logger::new(args.command.name());

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&opts, &log),
        cli::Command::Managers => {
            commands::managers::run(&log);
            Ok(())
        }
        cli::Command::Catalog(opts) => commands::catalog::run(&opts, &log),
        cli::Command::EnsureGit => commands::git::run(&log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
