//! Tilekit - Command-line tool for cutting tiles and composing tilemaps

use std::process::ExitCode;

use tilekit::cli;

fn main() -> ExitCode {
    cli::run()
}
