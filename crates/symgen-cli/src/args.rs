//! Command-line arguments for the `symgen` binary.

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the symgen binary.
#[derive(Parser, Debug)]
#[command(
    name = "symgen",
    version,
    about = "Generates typed wrapper sources from debug-symbol dumps"
)]
pub struct CliArgs {
    /// Path to the generation configuration (JSON).
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Directory generated sources are written to.
    #[arg(short = 'o', long = "out-dir", default_value = "generated")]
    pub out_dir: PathBuf,

    /// Concatenate every generated type into a single file.
    #[arg(long = "single-file")]
    pub single_file: bool,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
