//! Logging setup.
//!
//! `RUST_LOG` takes precedence; otherwise the level follows the `-v` / `-q`
//! flags. Output goes to stderr so `toc --json` stays clean.

use tracing_subscriber::EnvFilter;

/// Directive for the crate given the CLI verbosity flags.
pub fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "slidenav=error";
    }
    match verbose {
        0 => "slidenav=warn",
        1 => "slidenav=debug",
        _ => "slidenav=trace",
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(verbose: u8, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbose, quiet)));

    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(color)
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
