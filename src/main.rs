//! Command-line entry point for dfo.
use anyhow::Result;
use clap::Parser;

use dfo::cli::{Cli, Command};
use dfo::commands;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.command.unwrap_or(Command::Link) {
        Command::Link => commands::link::run(&args.global),
        Command::Status => commands::status::run(&args.global),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
