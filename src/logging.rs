//! Tracing setup for the command-line driver.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level.
///
/// `quiet` wins over `verbose`. Without flags only errors are logged, since
/// warnings about skipped files and failed moves are already part of the
/// regular output.
pub fn filter_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "off";
    }
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flags. Calling this more
/// than once keeps the first subscriber.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
