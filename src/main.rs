#![forbid(unsafe_code)]

//! cmk: chainmock event-log and configuration CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("cmk: {e}");
        std::process::exit(e.exit_code());
    }
}
