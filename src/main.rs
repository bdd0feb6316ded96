use clap::Parser;
use dirsort::cli::{Cli, run_cli};
use dirsort::logging::init_logging;
use dirsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run_cli(&cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::from(2)
        }
    }
}
