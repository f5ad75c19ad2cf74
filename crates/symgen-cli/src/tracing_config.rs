//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `SYMGEN_LOG` overrides the verbosity
/// picked from `-v` flags.
pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SYMGEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
