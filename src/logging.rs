use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `quiet` wins over `verbose`; with neither,
/// `RUST_LOG` applies and falls back to warnings only.
pub fn init(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("exochat=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests, nested commands) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
