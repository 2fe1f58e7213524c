//! Federated patient index CLI.

use std::fmt::Display;

use clap::Parser;
use mpi_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_check, run_integrate};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        std::process::exit(fail(format_args!("failed to initialize logging: {error}")));
    }
    let exit_code = match cli.command {
        Command::Integrate(args) => match run_integrate(&args) {
            Ok(result) => {
                print_summary(&result);
                i32::from(result.has_errors())
            }
            Err(error) => fail(format_args!("{error:#}")),
        },
        Command::Check(args) => match run_check(&args) {
            Ok(()) => 0,
            Err(error) => fail(format_args!("{error:#}")),
        },
    };
    std::process::exit(exit_code);
}

fn fail(message: impl Display) -> i32 {
    eprintln!("error: {message}");
    1
}
