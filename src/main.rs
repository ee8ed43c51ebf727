use std::process::ExitCode;

use clap::Parser;

use pytestgen::commands::{self, Cli};
use pytestgen::logger;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    commands::dispatch(cli)
}
